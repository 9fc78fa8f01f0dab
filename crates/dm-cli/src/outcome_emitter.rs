use dm_api::StepResult;
use dm_core::{ConversationSession, DmScriptError, StepOutcome};
use dm_api::Rendered;

use crate::{json_string, map_cli_json};

pub(crate) fn event_name(outcome: &StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Advanced { .. } => "ADVANCED",
        StepOutcome::AwaitingInput => "AWAITING_INPUT",
        StepOutcome::Completed { .. } => "COMPLETED",
        StepOutcome::LoopLimitExceeded => "LOOP_LIMIT",
        StepOutcome::InvalidState { .. } => "INVALID_STATE",
    }
}

fn session_lines(lines: &mut Vec<String>, session: &ConversationSession) {
    lines.push(format!("NODE:{}", session.current_node_id));
    lines.push(format!("STATUS:{}", session.status.name()));
}

fn message_lines(lines: &mut Vec<String>, message: &str, unresolved: &[String]) {
    lines.push(format!("MESSAGE_JSON:{}", json_string(message)));
    lines.extend(unresolved.iter().map(|name| format!("UNRESOLVED:{}", name)));
}

fn state_out_line(state_out: Option<&str>) -> String {
    format!("STATE_OUT:{}", state_out.unwrap_or("NONE"))
}

pub(crate) fn started_lines(
    session: &ConversationSession,
    opening: &Rendered,
    state_out: &str,
) -> Vec<String> {
    let mut lines = vec!["RESULT:OK".to_string(), "EVENT:STARTED".to_string()];
    session_lines(&mut lines, session);
    message_lines(&mut lines, &opening.text, &opening.unresolved);
    lines.push(state_out_line(Some(state_out)));
    lines
}

/// `reprompt` is the current node rendered again after `AwaitingInput`.
pub(crate) fn step_lines(
    result: &StepResult,
    reprompt: Option<&Rendered>,
    state_out: Option<&str>,
) -> Result<Vec<String>, DmScriptError> {
    let mut lines = vec![
        "RESULT:OK".to_string(),
        format!("EVENT:{}", event_name(&result.outcome)),
    ];
    session_lines(&mut lines, &result.session);

    if let StepOutcome::InvalidState { reason } = &result.outcome {
        lines.push(format!("REASON:{}", reason.name()));
    }
    if let Some(message) = result.outcome.message() {
        message_lines(
            &mut lines,
            message,
            result.outcome.unresolved_placeholders(),
        );
    } else if let Some(prompt) = reprompt {
        message_lines(&mut lines, &prompt.text, &prompt.unresolved);
    }
    if let Some(intent) = &result.intent {
        lines.push(format!("INTENT:{}", intent));
    }
    for warning in &result.warnings {
        let payload = serde_json::to_string(warning).map_err(map_cli_json)?;
        lines.push(format!("WARNING_JSON:{}", payload));
    }
    let signal = serde_json::to_string(&result.signal()).map_err(map_cli_json)?;
    lines.push(format!("SIGNAL_JSON:{}", signal));
    lines.push(state_out_line(state_out));
    Ok(lines)
}

pub(crate) fn emit_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod outcome_emitter_tests {
    use super::*;
    use crate::cli_test_support::*;
    use dm_api::{create_session, current_prompt, ConversationExecutor};

    #[test]
    fn started_lines_render_opening_message() {
        let loaded = fixture_script("01-storefront");
        let session = create_session(&loaded.script, "s1");
        let opening = current_prompt(&loaded.script, &session).expect("prompt should render");

        let lines = started_lines(&session, &opening, "/tmp/state.json");
        assert_eq!(
            lines,
            vec![
                "RESULT:OK",
                "EVENT:STARTED",
                "NODE:start",
                "STATUS:active",
                "MESSAGE_JSON:\"Hi! Want the price, or ready to buy?\"",
                "STATE_OUT:/tmp/state.json",
            ]
        );
    }

    #[test]
    fn step_lines_cover_advance_and_reprompt() {
        let loaded = fixture_script("01-storefront");
        let executor = ConversationExecutor::default();
        let session = create_session(&loaded.script, "s1");

        let advanced = executor.step(&loaded.script, &session, "how much?");
        let lines = step_lines(&advanced, None, Some("out.json")).expect("lines should build");
        assert_eq!(lines[1], "EVENT:ADVANCED");
        assert!(lines.contains(&"NODE:price".to_string()));
        assert!(lines.contains(&"INTENT:ask_price".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("SIGNAL_JSON:{")));
        assert_eq!(lines.last().map(String::as_str), Some("STATE_OUT:out.json"));

        let waiting = executor.step(&loaded.script, &advanced.session, "hmm");
        let prompt =
            current_prompt(&loaded.script, &waiting.session).expect("prompt should render");
        let lines = step_lines(&waiting, Some(&prompt), Some("out.json"))
            .expect("lines should build");
        assert_eq!(lines[1], "EVENT:AWAITING_INPUT");
        assert!(lines.contains(&"MESSAGE_JSON:\"The hoodie is $40. Want to buy one?\"".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("INTENT:")));
    }

    #[test]
    fn step_lines_report_completion_and_invalid_state() {
        let loaded = fixture_script("01-storefront");
        let executor = ConversationExecutor::default();
        let session = create_session(&loaded.script, "s1");

        let done = executor.step(&loaded.script, &session, "buy");
        let lines = step_lines(&done, None, None).expect("lines should build");
        assert_eq!(lines[1], "EVENT:COMPLETED");
        assert!(lines.contains(&"STATUS:completed".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("STATE_OUT:NONE"));

        let again = executor.step(&loaded.script, &done.session, "buy");
        let lines = step_lines(&again, None, None).expect("lines should build");
        assert_eq!(lines[1], "EVENT:INVALID_STATE");
        assert!(lines.contains(&"REASON:sessionNotActive".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("MESSAGE_JSON:")));
    }

    #[test]
    fn step_lines_list_unresolved_and_warnings() {
        let loaded = fixture_script("02-size-capture");
        let session = create_session(&loaded.script, "s1");
        let result = ConversationExecutor::default().step(&loaded.script, &session, "m");

        let lines = step_lines(&result, None, Some("out.json")).expect("lines should build");
        assert!(lines.contains(&"UNRESOLVED:size".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("WARNING_JSON:{\"kind\":\"typeMismatch\"")));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("WARNING_JSON:{\"kind\":\"unresolvedPlaceholder\"")));
        assert_eq!(event_name(&result.outcome), "ADVANCED");
    }
}
