//! State-driven rewrite of the designated document.
//!
//! # Pipeline
//! ```text
//! Start → DecodeText → ComputeEffectiveState → ApplySubstitutionSet(state) → Reencode → Serve
//!            │                                                                   ▲
//!            └──────────────── any failure: serve the original bytes ────────────┘
//! ```
//!
//! Substitutions are exact substrings, first occurrence only; a missing
//! target is skipped silently. The rule table below is the whole engine.

use std::borrow::Cow;

use crate::content::state::RegistrationState;
use crate::http::QueryParams;

/// Query flags that override the stored state, in precedence order.
const OVERRIDE_FLAGS: [(&str, RegistrationState); 3] = [
    ("open", RegistrationState::Open),
    ("warning", RegistrationState::Warning),
    ("closed", RegistrationState::Closed),
];

const STATUS_CLOSED: &str = r#"id="registrationStatus" class="registration-status closed""#;
const MESSAGE_CLOSED: &str = "❌ Les inscriptions sont fermées.";
const HEADING_CLOSE: &str = "</h1>";

const OPEN_RULES: &[(&str, &str)] = &[
    (
        STATUS_CLOSED,
        r#"id="registrationStatus" class="registration-status open""#,
    ),
    (MESSAGE_CLOSED, "✅ Les inscriptions sont ouvertes ! (server)"),
    (
        r#"id="openRegistrationContent" class="hidden""#,
        r#"id="openRegistrationContent""#,
    ),
];

const WARNING_RULES: &[(&str, &str)] = &[
    (
        STATUS_CLOSED,
        r#"id="registrationStatus" class="registration-status warning""#,
    ),
    (MESSAGE_CLOSED, "⚠️ Les inscriptions ouvriront bientôt (server)"),
];

/// Visual marker appended after the first heading.
struct Marker {
    label: &'static str,
    color: &'static str,
    emoji: &'static str,
}

impl Marker {
    fn render(&self) -> String {
        let Marker { label, color, emoji } = self;
        format!(
            concat!(
                r#"<div id="server-state-marker" style="margin:25px 0;padding:18px;border:3px dashed {color};"#,
                r#"background:rgba(0,0,0,0.03);font-size:20px;font-weight:bold;text-align:center;">"#,
                "{emoji} SERVER STATE: {label} {emoji}<br>",
                r#"<div style="font-size:12px;font-weight:normal;margin-top:8px;">"#,
                "(Injected block to guarantee detectable change size)</div></div>"
            ),
            color = color,
            emoji = emoji,
            label = label,
        )
    }
}

fn rules_for(state: RegistrationState) -> (&'static [(&'static str, &'static str)], Marker) {
    match state {
        RegistrationState::Open => (
            OPEN_RULES,
            Marker { label: "OPEN", color: "green", emoji: "✅" },
        ),
        RegistrationState::Warning => (
            WARNING_RULES,
            Marker { label: "WARNING", color: "orange", emoji: "⚠️" },
        ),
        RegistrationState::Closed => (
            &[],
            Marker { label: "CLOSED", color: "#888", emoji: "⛔" },
        ),
    }
}

/// Effective state for one rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteContext {
    pub state: RegistrationState,
    /// The query flag that decided `state`, if any.
    pub override_flag: Option<&'static str>,
}

impl RewriteContext {
    /// First present override flag wins; otherwise the stored state.
    pub fn resolve(current: RegistrationState, query: &QueryParams) -> Self {
        OVERRIDE_FLAGS
            .iter()
            .find(|(flag, _)| query.has(flag))
            .map(|&(flag, state)| Self {
                state,
                override_flag: Some(flag),
            })
            .unwrap_or(Self {
                state: current,
                override_flag: None,
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("document is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

/// Apply the substitution set for `ctx.state` to `text`.
pub fn rewrite_text(text: &str, ctx: &RewriteContext) -> String {
    let (rules, marker) = rules_for(ctx.state);
    let mut out = text.to_string();
    for (find, replace) in rules {
        out = replace_first(&out, find, replace);
    }
    let heading_with_marker = format!("{HEADING_CLOSE}{}", marker.render());
    replace_first(&out, HEADING_CLOSE, &heading_with_marker)
}

/// Decode, rewrite and re-encode.
pub fn rewrite_document(bytes: &[u8], ctx: &RewriteContext) -> Result<Vec<u8>, RewriteError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(rewrite_text(text, ctx).into_bytes())
}

/// The bytes to serve: rewritten when possible, the original otherwise.
pub fn render<'a>(bytes: &'a [u8], ctx: &RewriteContext) -> Cow<'a, [u8]> {
    match rewrite_document(bytes, ctx) {
        Ok(rewritten) => Cow::Owned(rewritten),
        Err(e) => {
            tracing::warn!(error = %e, "Dynamic mock transform failed; serving original");
            Cow::Borrowed(bytes)
        }
    }
}

fn replace_first(text: &str, find: &str, replace: &str) -> String {
    text.replacen(find, replace, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = concat!(
        "<html><body><h1>ECAV</h1>",
        r#"<div id="registrationStatus" class="registration-status closed">"#,
        "❌ Les inscriptions sont fermées.</div>",
        r#"<div id="openRegistrationContent" class="hidden">Form</div>"#,
        "<h1>Second</h1></body></html>"
    );

    fn ctx(state: RegistrationState) -> RewriteContext {
        RewriteContext {
            state,
            override_flag: None,
        }
    }

    #[test]
    fn open_applies_every_open_rule() {
        let out = rewrite_text(DOC, &ctx(RegistrationState::Open));
        assert!(out.contains(r#"class="registration-status open""#));
        assert!(out.contains("✅ Les inscriptions sont ouvertes ! (server)"));
        assert!(!out.contains(MESSAGE_CLOSED));
        assert!(out.contains(r#"<div id="openRegistrationContent">Form"#));
        assert!(out.contains("<h1>ECAV</h1><div id=\"server-state-marker\""));
        assert!(out.contains("✅ SERVER STATE: OPEN ✅"));
        assert!(out.contains("border:3px dashed green;"));
    }

    #[test]
    fn warning_keeps_open_content_hidden() {
        let out = rewrite_text(DOC, &ctx(RegistrationState::Warning));
        assert!(out.contains(r#"class="registration-status warning""#));
        assert!(out.contains("⚠️ Les inscriptions ouvriront bientôt (server)"));
        assert!(out.contains(r#"id="openRegistrationContent" class="hidden""#));
        assert!(out.contains("⚠️ SERVER STATE: WARNING ⚠️"));
    }

    #[test]
    fn closed_only_adds_marker() {
        let out = rewrite_text(DOC, &ctx(RegistrationState::Closed));
        assert!(out.contains(MESSAGE_CLOSED));
        assert!(out.contains(STATUS_CLOSED));
        assert!(out.contains("⛔ SERVER STATE: CLOSED ⛔"));
        assert!(out.contains("border:3px dashed #888;"));
        assert_eq!(out.replacen(&Marker { label: "CLOSED", color: "#888", emoji: "⛔" }.render(), "", 1), DOC);
    }

    #[test]
    fn marker_follows_first_heading_only() {
        let out = rewrite_text(DOC, &ctx(RegistrationState::Closed));
        assert_eq!(out.matches("server-state-marker").count(), 1);
        assert!(out.contains("<h1>Second</h1></body>"));
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let doc = format!("{MESSAGE_CLOSED}{MESSAGE_CLOSED}");
        let out = rewrite_text(&doc, &ctx(RegistrationState::Open));
        assert_eq!(out.matches(MESSAGE_CLOSED).count(), 1);
    }

    #[test]
    fn absent_targets_are_skipped() {
        let out = rewrite_text("plain text", &ctx(RegistrationState::Open));
        assert_eq!(out, "plain text");
    }

    #[test]
    fn override_precedence() {
        let closed = RegistrationState::Closed;
        let q = |raw| QueryParams::parse(Some(raw));

        assert_eq!(RewriteContext::resolve(closed, &q("open&warning")).state, RegistrationState::Open);
        assert_eq!(RewriteContext::resolve(closed, &q("closed&warning")).state, RegistrationState::Warning);
        assert_eq!(
            RewriteContext::resolve(RegistrationState::Open, &q("closed")).state,
            RegistrationState::Closed
        );

        let stored = RewriteContext::resolve(RegistrationState::Warning, &q("x=1"));
        assert_eq!(stored.state, RegistrationState::Warning);
        assert_eq!(stored.override_flag, None);
    }

    #[test]
    fn invalid_utf8_falls_back_to_original() {
        let bytes = b"<h1>t</h1>\xff\xfe";
        let served = render(bytes, &ctx(RegistrationState::Open));
        assert!(matches!(served, Cow::Borrowed(_)));
        assert_eq!(&*served, bytes);
    }

    #[test]
    fn valid_document_is_reencoded() {
        let served = render(DOC.as_bytes(), &ctx(RegistrationState::Open));
        assert!(String::from_utf8(served.into_owned()).unwrap().contains("SERVER STATE: OPEN"));
    }
}
