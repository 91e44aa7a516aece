//! Query codec.
//!
//! The drill path travels as one compact JSON token under the drill key:
//!
//! ```text
//! drill=[["region","R1","North"],["sub_region","S9","South"]]
//! ```
//!
//! (percent-encoded on the wire). The root is implicit and never appears in
//! the token. Filters travel as flat pairs beside it (`metric`, `range`,
//! `view`, `overlay`) so a filter change never has to touch the token.
//!
//! Decoding is total: a malformed token decodes to no drill entries, and an
//! unrecognized range or view tag decodes to the caller's default for that
//! key. `metric` and a non-empty `overlay` are opaque and decode as written.

use std::fmt;

use drill_model::{Filters, NavigationStack, ScopeLevel, ScopeRef, TimeRange, ViewMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::error::{CodecError, ConfigError};

// =============================================================================
// QUERY KEYS
// =============================================================================

/// Query-string key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryKeys {
    pub drill: String,
    pub metric: String,
    pub range: String,
    pub view: String,
    pub overlay: String,
}

impl Default for QueryKeys {
    fn default() -> Self {
        Self {
            drill: "drill".to_string(),
            metric: "metric".to_string(),
            range: "range".to_string(),
            view: "view".to_string(),
            overlay: "overlay".to_string(),
        }
    }
}

impl QueryKeys {
    fn named(&self) -> [(&'static str, &str); 5] {
        [
            ("drill", self.drill.as_str()),
            ("metric", self.metric.as_str()),
            ("range", self.range.as_str()),
            ("view", self.view.as_str()),
            ("overlay", self.overlay.as_str()),
        ]
    }

    /// Check that every key is non-empty and distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = self.named();
        for (index, (field, key)) in named.iter().enumerate() {
            if key.is_empty() {
                return Err(ConfigError::EmptyKey { field: *field });
            }
            if named[..index].iter().any(|(_, earlier)| earlier == key) {
                return Err(ConfigError::DuplicateKey((*key).to_string()));
            }
        }
        Ok(())
    }

    /// True when `key` belongs to the codec.
    pub fn contains(&self, key: &str) -> bool {
        self.named().iter().any(|(_, managed)| *managed == key)
    }
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// Comparison key for a written or observed view.
///
/// This is the managed part of the query string exactly as the codec
/// would write it, so two views share a signature iff they encode equally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the default view (no managed keys).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// DECODED STATE
// =============================================================================

/// Raw state read from a query string.
///
/// `scopes` is not canonicalized; callers build a stack from it against
/// their root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub scopes: Vec<ScopeRef>,
    pub filters: Filters,
}

impl QueryState {
    /// Build the canonical stack this state describes.
    pub fn into_stack(self, root: ScopeRef) -> NavigationStack {
        NavigationStack::from_scopes(root, self.scopes, &self.filters)
    }
}

// =============================================================================
// CODEC
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct QueryCodec {
    keys: QueryKeys,
}

impl QueryCodec {
    pub fn new(keys: QueryKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &QueryKeys {
        &self.keys
    }

    // -------------------------------------------------------------------------
    // Drill token
    // -------------------------------------------------------------------------

    /// Serialize scopes as a compact `[[level, id, label], ...]` token.
    pub fn encode_token(scopes: &[ScopeRef]) -> String {
        let triples = scopes
            .iter()
            .map(|scope| {
                Value::Array(vec![
                    Value::from(scope.level.as_tag()),
                    Value::from(scope.id.as_str()),
                    Value::from(scope.label.as_str()),
                ])
            })
            .collect();
        Value::Array(triples).to_string()
    }

    /// Token for the non-root part of `stack`, or `None` at root.
    pub fn encode_stack(stack: &NavigationStack) -> Option<String> {
        if stack.is_root_only() {
            return None;
        }
        let scopes: Vec<ScopeRef> = stack
            .drill_entries()
            .iter()
            .map(drill_model::ScopeEntry::scope_ref)
            .collect();
        Some(Self::encode_token(&scopes))
    }

    /// Strict token decoding.
    ///
    /// A missing label defaults to the id.
    pub fn try_decode_token(token: &str) -> Result<Vec<ScopeRef>, CodecError> {
        let raw: Vec<Vec<String>> = serde_json::from_str(token)?;
        raw.into_iter()
            .enumerate()
            .map(|(index, fields)| {
                let len = fields.len();
                if !(2..=3).contains(&len) {
                    return Err(CodecError::Arity { index, len });
                }
                let mut fields = fields.into_iter();
                let tag = fields.next().unwrap_or_default();
                let id = fields.next().unwrap_or_default();
                let label = fields.next().unwrap_or_else(|| id.clone());
                let level = ScopeLevel::from_tag(&tag)
                    .ok_or(CodecError::UnknownLevel { index, tag })?;
                if id.is_empty() {
                    return Err(CodecError::EmptyId { index });
                }
                Ok(ScopeRef { level, id, label })
            })
            .collect()
    }

    /// Defensive token decoding: any failure yields no entries.
    pub fn decode_token(token: &str) -> Vec<ScopeRef> {
        if token.trim().is_empty() {
            return Vec::new();
        }
        match Self::try_decode_token(token) {
            Ok(scopes) => scopes,
            Err(error) => {
                debug!(%error, "ignoring malformed drill token");
                Vec::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Decode filters from parsed pairs, falling back per key to `defaults`.
    ///
    /// A present `metric` is taken as written, even when empty. An empty
    /// `overlay` value means "explicitly no overlay"; an absent one means the
    /// default overlay.
    pub fn decode_filters(&self, pairs: &[(String, String)], defaults: &Filters) -> Filters {
        let metric = lookup(pairs, &self.keys.metric)
            .map_or_else(|| defaults.metric.clone(), str::to_string);
        let range = lookup(pairs, &self.keys.range)
            .and_then(TimeRange::from_tag)
            .unwrap_or(defaults.range);
        let view_mode = lookup(pairs, &self.keys.view)
            .and_then(ViewMode::from_tag)
            .unwrap_or(defaults.view_mode);
        let overlay = match lookup(pairs, &self.keys.overlay) {
            Some("") => None,
            Some(value) => Some(value.to_string()),
            None => defaults.overlay.clone(),
        };
        Filters {
            metric,
            range,
            view_mode,
            overlay,
        }
    }

    fn filter_pairs(&self, filters: &Filters, defaults: &Filters) -> Vec<(String, String)> {
        let mut pairs = vec![
            (self.keys.metric.clone(), filters.metric.clone()),
            (self.keys.range.clone(), filters.range.as_tag().to_string()),
            (self.keys.view.clone(), filters.view_mode.as_tag().to_string()),
        ];
        match (filters.overlay.as_deref(), &defaults.overlay) {
            (Some(overlay), _) if !overlay.is_empty() => {
                pairs.push((self.keys.overlay.clone(), overlay.to_string()));
            }
            (_, Some(_)) => pairs.push((self.keys.overlay.clone(), String::new())),
            (_, None) => {}
        }
        pairs
    }

    // -------------------------------------------------------------------------
    // Whole query
    // -------------------------------------------------------------------------

    /// Key/value pairs owned by the codec for this view, in write order.
    ///
    /// The default view (root only, default filters) owns no pairs.
    pub fn managed_pairs(
        &self,
        stack: &NavigationStack,
        filters: &Filters,
        defaults: &Filters,
    ) -> Vec<(String, String)> {
        if stack.is_root_only() && filters == defaults {
            return Vec::new();
        }
        let mut pairs = Vec::with_capacity(5);
        if let Some(token) = Self::encode_stack(stack) {
            pairs.push((self.keys.drill.clone(), token));
        }
        pairs.extend(self.filter_pairs(filters, defaults));
        pairs
    }

    /// Query string (without `?`) holding only the managed keys.
    pub fn encode(&self, stack: &NavigationStack, filters: &Filters, defaults: &Filters) -> String {
        serialize_pairs(self.managed_pairs(stack, filters, defaults))
    }

    pub fn signature(
        &self,
        stack: &NavigationStack,
        filters: &Filters,
        defaults: &Filters,
    ) -> Signature {
        Signature(self.encode(stack, filters, defaults))
    }

    /// Decode a full query string (a leading `?` is allowed).
    pub fn decode(&self, query: &str, defaults: &Filters) -> QueryState {
        let pairs = parse_pairs(query);
        let scopes = lookup(&pairs, &self.keys.drill)
            .map(Self::decode_token)
            .unwrap_or_default();
        QueryState {
            scopes,
            filters: self.decode_filters(&pairs, defaults),
        }
    }

    /// Rebuild `current` with `managed` in place of the codec's keys.
    ///
    /// Foreign keys keep their relative order after the managed ones.
    pub fn merge(&self, current: &str, managed: Vec<(String, String)>) -> String {
        let foreign = parse_pairs(current)
            .into_iter()
            .filter(|(key, _)| !self.keys.contains(key));
        serialize_pairs(managed.into_iter().chain(foreign))
    }
}

/// Parse `application/x-www-form-urlencoded` pairs, tolerating a leading `?`.
pub fn parse_pairs(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn serialize_pairs<I>(pairs: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(&key, &value);
    }
    serializer.finish()
}

/// First value for `key`.
fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(candidate, _)| candidate == key)
        .map(|(_, value)| value.as_str())
}
