//! Sniff registration and token dispatch

use std::collections::{HashMap, HashSet};

use crate::file::FileContext;
use crate::token::TokenKind;

/// What a sniff wants the dispatcher to do after one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffControl {
    Continue,
    /// Suppress this sniff's own callbacks until the given index. An
    /// optimization hook for sniffs that consume a whole region at once;
    /// other sniffs are unaffected.
    SkipTo(usize),
}

/// A configuration value passed through to a sniff. The engine does not
/// interpret these; each sniff reads its own at configure time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Parameters for one sniff, keyed by parameter name.
pub type ParamMap = HashMap<String, ParamValue>;

/// A unit of detection logic listening for specific token kinds.
///
/// Sniffs are registered once per run and must not keep state between
/// files; everything they learn goes out through the context's reporting
/// and fixer interfaces.
pub trait Sniff: Send + Sync {
    /// Stable dotted identifier (`Standard.Category.Sniff`). Violation
    /// codes extend it with one more segment.
    fn code(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Token kinds this sniff is dispatched for.
    fn register(&self) -> &'static [TokenKind];

    /// Apply per-sniff configuration before the run starts.
    fn configure(&mut self, _params: &ParamMap) {}

    fn process(&self, ctx: &mut FileContext, index: usize) -> SniffControl;
}

/// The set of active sniffs for an analysis run. Shared immutably across
/// worker threads once configured.
#[derive(Default)]
pub struct SniffRegistry {
    sniffs: Vec<Box<dyn Sniff>>,
}

impl SniffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sniff: Box<dyn Sniff>) {
        self.sniffs.push(sniff);
    }

    pub fn len(&self) -> usize {
        self.sniffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sniffs.is_empty()
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.sniffs.iter().map(|s| s.code()).collect()
    }

    pub fn get(&self, code: &str) -> Option<&dyn Sniff> {
        self.sniffs
            .iter()
            .find(|s| s.code() == code)
            .map(|s| s.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Sniff> {
        self.sniffs.iter().map(|s| s.as_ref())
    }

    /// Keep only the sniffs whose code is in `enabled`, preserving
    /// registration order.
    pub fn retain_enabled(&mut self, enabled: &HashSet<String>) {
        self.sniffs.retain(|s| enabled.contains(s.code()));
    }

    /// Deliver per-sniff parameters, keyed by sniff code.
    pub fn configure_all(&mut self, params: &HashMap<String, ParamMap>) {
        for sniff in &mut self.sniffs {
            if let Some(map) = params.get(sniff.code()) {
                sniff.configure(map);
            }
        }
    }

    /// One linear pass over the file. Each token is offered to every
    /// sniff registered for its kind, in registration order.
    pub fn run(&self, ctx: &mut FileContext) {
        let mut by_kind: HashMap<TokenKind, Vec<usize>> = HashMap::new();
        for (sniff_index, sniff) in self.sniffs.iter().enumerate() {
            for &kind in sniff.register() {
                let entry = by_kind.entry(kind).or_default();
                if entry.last() != Some(&sniff_index) {
                    entry.push(sniff_index);
                }
            }
        }

        let mut resume = vec![0usize; self.sniffs.len()];
        for index in 0..ctx.token_count() {
            let kind = match ctx.kind(index) {
                Some(kind) => kind,
                None => break,
            };
            let Some(interested) = by_kind.get(&kind) else {
                continue;
            };
            for &sniff_index in interested {
                if index < resume[sniff_index] {
                    continue;
                }
                match self.sniffs[sniff_index].process(ctx, index) {
                    SniffControl::Continue => {}
                    SniffControl::SkipTo(target) => resume[sniff_index] = target,
                }
            }
        }
    }
}
