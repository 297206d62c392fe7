//! Fixer - transactional text edits addressed by token index
//!
//! Sniffs propose edits inside changesets. A changeset either applies in
//! full or is discarded: conflicting edits inside one changeset discard it
//! and surface a [`Conflict`] instead of a corrupt result. Across
//! changesets, the first to claim a token's body wins the pass; later
//! claims are deferred and re-proposed by their sniff on the next pass,
//! against re-tokenized positions.

use std::collections::HashMap;

use thiserror::Error;

use crate::token::Token;

/// A single requested edit at a token position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub token: usize,
    pub op: EditOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Replace the token's text.
    Replace(String),
    /// Insert text immediately before the token.
    InsertBefore(String),
    /// Insert text immediately after the token.
    InsertAfter(String),
    /// Remove the token's text.
    Delete,
}

impl EditOp {
    /// Replace and Delete claim the token body; inserts do not.
    fn claims_body(&self) -> bool {
        matches!(self, EditOp::Replace(_) | EditOp::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("conflicting edits target the same token")]
    DuplicateTarget,
    #[error("edit targets a token outside the file")]
    OutOfBounds,
}

/// A discarded changeset, positioned at the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub token: usize,
}

/// Edits proposed atomically by one sniff invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    edits: Vec<Edit>,
}

impl Changeset {
    fn validate(&self, token_count: usize) -> Result<(), Conflict> {
        let mut body_claims: HashMap<usize, usize> = HashMap::new();
        for edit in &self.edits {
            if edit.token >= token_count {
                return Err(Conflict {
                    kind: ConflictKind::OutOfBounds,
                    token: edit.token,
                });
            }
            if edit.op.claims_body() {
                let count = body_claims.entry(edit.token).or_insert(0);
                *count += 1;
                if *count > 1 {
                    return Err(Conflict {
                        kind: ConflictKind::DuplicateTarget,
                        token: edit.token,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Result of applying one pass worth of changesets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub source: String,
    /// Changesets written into the new source.
    pub applied: usize,
    /// Changesets skipped because an earlier one claimed the same token;
    /// their sniffs see fresh positions on the next pass.
    pub deferred: usize,
}

/// Collects changesets during one dispatch pass over a file.
///
/// Disabled outside fix mode: every mutator is then a no-op, so sniff code
/// can stay identical between analyze and fix runs.
#[derive(Debug)]
pub struct Fixer {
    enabled: bool,
    token_count: usize,
    current: Option<Changeset>,
    accepted: Vec<Changeset>,
    conflicts: Vec<Conflict>,
}

impl Fixer {
    pub fn new(enabled: bool, token_count: usize) -> Self {
        Self {
            enabled,
            token_count,
            current: None,
            accepted: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open a changeset. An unfinished previous changeset is dropped.
    pub fn begin_changeset(&mut self) {
        if !self.enabled {
            return;
        }
        self.current = Some(Changeset::default());
    }

    pub fn replace(&mut self, token: usize, text: impl Into<String>) {
        self.add(Edit {
            token,
            op: EditOp::Replace(text.into()),
        });
    }

    pub fn insert_before(&mut self, token: usize, text: impl Into<String>) {
        self.add(Edit {
            token,
            op: EditOp::InsertBefore(text.into()),
        });
    }

    pub fn insert_after(&mut self, token: usize, text: impl Into<String>) {
        self.add(Edit {
            token,
            op: EditOp::InsertAfter(text.into()),
        });
    }

    pub fn delete(&mut self, token: usize) {
        self.add(Edit {
            token,
            op: EditOp::Delete,
        });
    }

    fn add(&mut self, edit: Edit) {
        if !self.enabled {
            return;
        }
        match self.current.as_mut() {
            Some(changeset) => changeset.edits.push(edit),
            None => {
                // Edit outside a changeset: a changeset of one.
                let changeset = Changeset { edits: vec![edit] };
                self.accept(changeset);
            }
        }
    }

    /// Close the open changeset. Returns false when the changeset was
    /// discarded because its edits conflict; the conflict is kept for the
    /// caller to surface.
    pub fn end_changeset(&mut self) -> bool {
        let Some(changeset) = self.current.take() else {
            return true;
        };
        if changeset.edits.is_empty() {
            return true;
        }
        self.accept(changeset)
    }

    fn accept(&mut self, changeset: Changeset) -> bool {
        match changeset.validate(self.token_count) {
            Ok(()) => {
                self.accepted.push(changeset);
                true
            }
            Err(conflict) => {
                self.conflicts.push(conflict);
                false
            }
        }
    }

    /// Changesets accepted so far in this pass.
    pub fn changeset_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn take_conflicts(&mut self) -> Vec<Conflict> {
        std::mem::take(&mut self.conflicts)
    }

    /// Write the accepted changesets into a new source string. Returns
    /// None when the pass proposed nothing.
    pub fn apply(&self, tokens: &[Token]) -> Option<ApplyOutcome> {
        if self.accepted.is_empty() {
            return None;
        }

        let mut bodies: HashMap<usize, String> = HashMap::new();
        let mut before: HashMap<usize, String> = HashMap::new();
        let mut after: HashMap<usize, String> = HashMap::new();
        let mut applied = 0;
        let mut deferred = 0;

        for changeset in &self.accepted {
            let contested = changeset
                .edits
                .iter()
                .any(|e| e.op.claims_body() && bodies.contains_key(&e.token));
            if contested {
                deferred += 1;
                continue;
            }
            applied += 1;
            for edit in &changeset.edits {
                match &edit.op {
                    EditOp::Replace(text) => {
                        bodies.insert(edit.token, text.clone());
                    }
                    EditOp::Delete => {
                        bodies.insert(edit.token, String::new());
                    }
                    EditOp::InsertBefore(text) => {
                        before.entry(edit.token).or_default().push_str(text);
                    }
                    EditOp::InsertAfter(text) => {
                        after.entry(edit.token).or_default().push_str(text);
                    }
                }
            }
        }

        let mut source = String::with_capacity(tokens.iter().map(|t| t.len()).sum::<usize>() + 16);
        for (i, token) in tokens.iter().enumerate() {
            if let Some(text) = before.get(&i) {
                source.push_str(text);
            }
            match bodies.get(&i) {
                Some(replacement) => source.push_str(replacement),
                None => source.push_str(&token.text),
            }
            if let Some(text) = after.get(&i) {
                source.push_str(text);
            }
        }

        Some(ApplyOutcome {
            source,
            applied,
            deferred,
        })
    }
}
