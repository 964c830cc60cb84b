//! Template reference resolution
//!
//! Every operation key, operation expression, and display template runs
//! through the same pipeline before it is applied or shown:
//!
//! 1. entry markers: `$id` (acting entry's chain root) and `$id(<entry>)`
//!    are rewritten to the internal lineage marker `#<root-id>`, making the
//!    key distinct per lineage;
//! 2. `[key]` dependency references, resolved rightmost-first so nested
//!    references like `[stat_[level]]` collapse from the inside out; the
//!    function store wins over the value store, and a function's formula is
//!    re-resolved recursively on every reference;
//! 3. `[*suffix]` wildcard aggregates: the float sum of every value and
//!    function key ending in `suffix`;
//! 4. `{expr}` arithmetic/boolean evaluation over the fully substituted
//!    text.
//!
//! Resolution failures are diagnostic, never fatal: an unknown key becomes
//! the literal placeholder `<missing:key>` and a non-evaluable `{...}` is
//! left untouched.

use crate::chains::ChainIndex;
use crate::domain::value_objects::{CharacterId, EntryId};
use crate::dynamic::expr;
use crate::dynamic::store::Frame;

/// Marker character tagging lineage-scoped (private) keys
pub const LINEAGE_MARKER: char = '#';

/// Recursion guard for function formulas referencing other functions
const MAX_DEPTH: usize = 16;
/// Guard against reference substitutions that keep producing references
const MAX_PASSES: usize = 100;

/// Everything a resolution pass needs to look values up
pub struct ResolveContext<'a> {
    pub frame: &'a Frame,
    pub character: &'a CharacterId,
    /// Chain root of the acting entry, anchoring bare `$id`
    pub anchor: Option<&'a EntryId>,
    pub chains: &'a ChainIndex,
}

impl<'a> ResolveContext<'a> {
    fn for_character<'b>(&'b self, character: &'b CharacterId) -> ResolveContext<'b> {
        ResolveContext {
            frame: self.frame,
            character,
            anchor: self.anchor,
            chains: self.chains,
        }
    }
}

/// Resolve a full template: markers, references, then arithmetic.
pub fn resolve_template(input: &str, ctx: &ResolveContext) -> String {
    let rewritten = rewrite_markers(input, ctx);
    let substituted = resolve_refs(&rewritten, ctx, 0);
    eval_arithmetic(&substituted)
}

/// Resolve an operation key, returning the store it targets.
///
/// A `$char(<id>)>` prefix redirects the assignment to that character.
pub fn resolve_key(input: &str, ctx: &ResolveContext) -> (CharacterId, String) {
    let rewritten = rewrite_markers(input, ctx);
    let substituted = resolve_refs(&rewritten, ctx, 0);
    match split_redirect(&substituted) {
        Some((character, key)) => (character, key.to_string()),
        None => (ctx.character.clone(), substituted),
    }
}

/// Placeholder substituted for an unresolvable reference.
pub fn missing(key: &str) -> String {
    format!("<missing:{key}>")
}

fn split_redirect(key: &str) -> Option<(CharacterId, &str)> {
    let rest = key.strip_prefix("$char(")?;
    let close = rest.find(")>")?;
    Some((CharacterId::from(&rest[..close]), &rest[close + 2..]))
}

/// Rewrite `$id(...)` and bare `$id` into lineage markers.
///
/// Also used on its own when a function formula is declared: markers are
/// captured at declaration time, references stay live.
pub(crate) fn rewrite_markers(input: &str, ctx: &ResolveContext) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(at) = rest.find("$id") {
        out.push_str(&rest[..at]);
        let after = &rest[at + 3..];
        if let Some(args) = after.strip_prefix('(')
            && let Some(close) = args.find(')')
        {
            let entry = EntryId::from(&args[..close]);
            let root = ctx
                .chains
                .root_of(&entry)
                .map(|r| r.clone())
                .unwrap_or_else(|_| {
                    log::warn!("entry marker '$id({entry})' does not match a known entry");
                    entry
                });
            out.push(LINEAGE_MARKER);
            out.push_str(root.as_str());
            rest = &args[close + 1..];
        } else {
            match ctx.anchor {
                Some(anchor) => {
                    out.push(LINEAGE_MARKER);
                    out.push_str(anchor.as_str());
                }
                None => {
                    log::warn!("bare '$id' used without an entry anchor");
                    out.push_str("$id");
                }
            }
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// Resolve `[key]` and `[*suffix]` references, rightmost-first.
fn resolve_refs(input: &str, ctx: &ResolveContext, depth: usize) -> String {
    if depth > MAX_DEPTH {
        log::warn!("reference recursion limit reached while resolving '{input}'");
        return input.to_string();
    }

    let mut text = input.to_string();
    for _ in 0..MAX_PASSES {
        let Some(open) = text.rfind('[') else { break };
        let Some(close_rel) = text[open..].find(']') else {
            break;
        };
        let close = open + close_rel;
        let content = text[open + 1..close].to_string();

        let replacement = if let Some(suffix) = content.strip_prefix('*') {
            wildcard_sum(suffix, ctx, depth)
        } else {
            lookup(&content, ctx, depth)
        };
        text.replace_range(open..=close, &replacement);
    }
    text
}

/// Look one key up: function store first, then value store.
fn lookup(reference: &str, ctx: &ResolveContext, depth: usize) -> String {
    let (character, key) = match split_redirect(reference) {
        Some((character, key)) => (character, key.to_string()),
        None => (ctx.character.clone(), reference.to_string()),
    };
    let Some(store) = ctx.frame.get(&character) else {
        log::warn!("reference '{reference}' names unknown character '{character}'");
        return missing(reference);
    };
    if let Some(formula) = store.functions.get(&key) {
        let scoped = ctx.for_character(&character);
        let resolved = resolve_refs(formula, &scoped, depth + 1);
        return eval_arithmetic(&resolved);
    }
    if let Some(value) = store.values.get(&key) {
        return value.render();
    }
    log::warn!("unresolvable reference '{key}' for character '{character}'");
    missing(&key)
}

/// Sum every value and function key ending in `suffix`, coerced to float.
fn wildcard_sum(suffix: &str, ctx: &ResolveContext, depth: usize) -> String {
    let Some(store) = ctx.frame.get(ctx.character) else {
        return missing(suffix);
    };
    let mut total = 0.0f64;
    for (key, value) in &store.values {
        if key.ends_with(suffix)
            && let Ok(number) = value.render().parse::<f64>()
        {
            total += number;
        }
    }
    for (key, formula) in &store.functions {
        if key.ends_with(suffix) {
            let resolved = eval_arithmetic(&resolve_refs(formula, ctx, depth + 1));
            if let Ok(number) = resolved.parse::<f64>() {
                total += number;
            }
        }
    }
    if total.fract() == 0.0 && total.is_finite() {
        (total as i64).to_string()
    } else {
        total.to_string()
    }
}

/// Evaluate `{...}` spans after substitution; failures leave the text as-is.
fn eval_arithmetic(input: &str) -> String {
    let mut text = input.to_string();
    let mut limit = text.len();
    loop {
        let Some(open) = text[..limit].rfind('{') else {
            break;
        };
        let Some(close_rel) = text[open..].find('}') else {
            limit = open;
            continue;
        };
        let close = open + close_rel;
        match expr::evaluate(&text[open + 1..close]) {
            Ok(value) => {
                let rendered = value.render();
                text.replace_range(open..=close, &rendered);
                // Re-scan to the left; an enclosing pair may now be evaluable
                limit = open;
            }
            Err(err) => {
                log::warn!(
                    "expression '{}' left unevaluated: {err}",
                    &text[open + 1..close]
                );
                limit = open;
            }
        }
    }
    text
}
