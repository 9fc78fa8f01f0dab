use std::collections::BTreeMap;
use std::path::Path;

use dm_api::{
    create_session_with_bindings, current_prompt, ConversationExecutor, ExecutorOptions,
    DEFAULT_MAX_STEPS,
};
use dm_core::DmScriptError;

use crate::{
    emit_lines, load_agent_state, load_script_from_path, save_agent_state, started_lines,
    step_lines, AgentArgs, AgentCommand, AgentState, SayArgs, StartArgs,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, DmScriptError> {
    match args.command {
        AgentCommand::Start(args) => run_start(args),
        AgentCommand::Say(args) => run_say(args),
    }
}

pub(crate) fn parse_bind_args(raw: &[String]) -> Result<BTreeMap<String, String>, DmScriptError> {
    let mut seeds = BTreeMap::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once('=') else {
            return Err(DmScriptError::new(
                "CLI_BIND_FORMAT",
                format!("Expected name=value, got \"{}\".", entry),
            ));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(DmScriptError::new(
                "CLI_BIND_FORMAT",
                format!("Binding name is empty in \"{}\".", entry),
            ));
        }
        seeds.insert(name.to_string(), value.to_string());
    }
    Ok(seeds)
}

pub(super) fn run_start(args: StartArgs) -> Result<i32, DmScriptError> {
    let loaded = load_script_from_path(&args.script)?;
    let seeds = parse_bind_args(&args.bind)?;
    let session = create_session_with_bindings(&loaded.script, args.session_id, &seeds)?;
    let opening = current_prompt(&loaded.script, &session)?;
    let max_steps = args.max_steps.unwrap_or(DEFAULT_MAX_STEPS);

    let state = AgentState::new(&loaded.path, max_steps, session);
    save_agent_state(Path::new(&args.state_out), &state)?;
    tracing::debug!(
        session_id = %state.session.session_id,
        script = %loaded.path,
        "agent session started"
    );

    emit_lines(&started_lines(&state.session, &opening, &args.state_out));
    Ok(0)
}

pub(super) fn run_say(args: SayArgs) -> Result<i32, DmScriptError> {
    let state = load_agent_state(Path::new(&args.state_in))?;
    let loaded = load_script_from_path(&state.script_path)?;
    let executor = ConversationExecutor::new(ExecutorOptions {
        max_steps: state.max_steps,
    });

    let result = executor.step(&loaded.script, &state.session, &args.text);
    let reprompt = if result.session.is_active() && result.outcome.message().is_none() {
        Some(current_prompt(&loaded.script, &result.session)?)
    } else {
        None
    };

    let state_out = if result.session.is_active() {
        let next = AgentState::new(&state.script_path, state.max_steps, result.session.clone());
        save_agent_state(Path::new(&args.state_out), &next)?;
        Some(args.state_out.as_str())
    } else {
        None
    };

    emit_lines(&step_lines(&result, reprompt.as_ref(), state_out)?);
    Ok(0)
}
