//! Prompt construction.
//!
//! Turns a system instruction, the caller-supplied conversation history, and
//! the new user message into the single prompt string the backend expects.
//! Pure and total: identical inputs always produce byte-identical output,
//! and nothing here can fail.

use crate::schemas::chat::ChatTurn;

/// Render the full prompt the backend should continue from.
///
/// Format, each part on its own line:
///
/// ```text
/// <system instruction>
///
/// User: <turn 1>
/// Assistant: <turn 2>
/// User: <new message>
/// Assistant:
/// ```
///
/// History order is preserved as supplied.  Any role other than `"user"` is
/// rendered as `Assistant` – malformed entries are tolerated, not rejected.
/// The trailing `Assistant:` marker tells the model where to continue.
pub fn build_prompt(system_instruction: &str, history: &[ChatTurn], new_message: &str) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(history.len() + 3);
    lines.push(system_instruction.to_owned());
    lines.push(String::new());

    for turn in history {
        lines.push(format!("{}: {}", render_role(&turn.role), turn.content));
    }

    lines.push(format!("User: {new_message}"));
    lines.push("Assistant:".to_owned());
    lines.join("\n")
}

fn render_role(role: &str) -> &'static str {
    match role {
        "user" => "User",
        _ => "Assistant",
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn {
            role: role.into(),
            content: content.into(),
        }
    }

    #[test]
    fn renders_history_in_order() {
        let history = vec![turn("user", "hi"), turn("assistant", "hello!")];
        let prompt = build_prompt("Be brief.", &history, "how are you?");
        assert_eq!(
            prompt,
            "Be brief.\n\nUser: hi\nAssistant: hello!\nUser: how are you?\nAssistant:"
        );
    }

    #[test]
    fn empty_history_still_has_markers() {
        let prompt = build_prompt("Be brief.", &[], "hi");
        assert_eq!(prompt, "Be brief.\n\nUser: hi\nAssistant:");
    }

    #[test]
    fn unknown_roles_render_as_assistant() {
        let history = vec![turn("system", "x"), turn("tool", "y")];
        let prompt = build_prompt("S", &history, "m");
        assert_eq!(prompt, "S\n\nAssistant: x\nAssistant: y\nUser: m\nAssistant:");
    }

    #[test]
    fn identical_inputs_yield_identical_bytes() {
        let history = vec![turn("user", "a"), turn("assistant", "b")];
        let a = build_prompt("S", &history, "m");
        let b = build_prompt("S", &history, "m");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}
