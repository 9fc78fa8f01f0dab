use crate::*;

pub const DEFAULT_MAX_STEPS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub max_steps: u32,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub session: ConversationSession,
    pub outcome: StepOutcome,
    pub warnings: Vec<StepWarning>,
    pub intent: Option<String>,
    pub from_node_id: String,
}

impl StepResult {
    pub fn signal(&self) -> StepSignal {
        StepSignal {
            session_id: self.session.session_id.clone(),
            script_id: self.session.script_id.clone(),
            script_version: self.session.script_version,
            from_node_id: self.from_node_id.clone(),
            to_node_id: self.session.current_node_id.clone(),
            outcome: self.outcome.kind_name().to_string(),
            intent: self.intent.clone(),
            step_count: self.session.step_count,
        }
    }

    pub fn into_parts(self) -> (ConversationSession, StepOutcome) {
        (self.session, self.outcome)
    }

    fn untouched(session: &ConversationSession, reason: InvalidStateReason) -> Self {
        Self {
            session: session.clone(),
            outcome: StepOutcome::InvalidState { reason },
            warnings: Vec::new(),
            intent: None,
            from_node_id: session.current_node_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConversationExecutor {
    options: ExecutorOptions,
}

impl ConversationExecutor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    pub fn step(&self, script: &Script, session: &ConversationSession, input: &str) -> StepResult {
        if !session.is_active() {
            return StepResult::untouched(session, InvalidStateReason::SessionNotActive);
        }
        if session.script_id != script.id() || session.script_version != script.version() {
            return StepResult::untouched(session, InvalidStateReason::ScriptMismatch);
        }

        let from_node_id = session.current_node_id.clone();
        let mut next = session.clone();
        next.step_count = next.step_count.saturating_add(1);
        let mut warnings = Vec::new();
        let mut intent = None;

        let outcome = match self.advance(script, &mut next, input, &mut warnings, &mut intent) {
            Ok(outcome) => outcome,
            Err(reason) => {
                next.status = SessionStatus::Failed;
                StepOutcome::InvalidState { reason }
            }
        };
        let outcome = self.apply_loop_guard(&mut next, outcome);

        tracing::debug!(
            session_id = %next.session_id,
            script_id = %next.script_id,
            from = %from_node_id,
            to = %next.current_node_id,
            outcome = outcome.kind_name(),
            step_count = next.step_count,
            "conversation step"
        );

        StepResult {
            session: next,
            outcome,
            warnings,
            intent,
            from_node_id,
        }
    }

    fn advance(
        &self,
        script: &Script,
        session: &mut ConversationSession,
        input: &str,
        warnings: &mut Vec<StepWarning>,
        intent: &mut Option<String>,
    ) -> Result<StepOutcome, InvalidStateReason> {
        let resting = script
            .node(&session.current_node_id)
            .ok_or(InvalidStateReason::UnknownNode)?;

        // Only an entry Message node can be at rest; settle it before reading input.
        let mut settled = Vec::new();
        let current = follow_messages(script, resting, &mut settled)?;
        enter_nodes(session, &settled);

        if current.kind() == NodeKind::Terminal {
            if settled.is_empty() {
                return Err(InvalidStateReason::TerminalWhileActive);
            }
            let rendered = render_chain(script, &session.bindings, &[current], warnings);
            session.status = SessionStatus::Completed;
            return Ok(StepOutcome::Completed {
                message: rendered.text,
                unresolved_placeholders: rendered.unresolved,
            });
        }

        let transition = match match_transition(current, input) {
            MatchResult::NoMatch => return Ok(StepOutcome::AwaitingInput),
            MatchResult::Matched { index, captures } => {
                merge_captures(script, session, captures, warnings);
                &current.transitions()[index]
            }
        };

        let target = script
            .node(transition.target_node_id())
            .ok_or(InvalidStateReason::UnknownNode)?;
        *intent = transition.intent().map(str::to_string);

        let mut arrived = vec![target];
        let destination = follow_messages(script, target, &mut arrived)?;
        enter_nodes(session, &arrived);
        let rendered = render_chain(script, &session.bindings, &arrived, warnings);

        if destination.kind() == NodeKind::Terminal {
            session.status = SessionStatus::Completed;
            return Ok(StepOutcome::Completed {
                message: rendered.text,
                unresolved_placeholders: rendered.unresolved,
            });
        }

        Ok(StepOutcome::Advanced {
            message: rendered.text,
            unresolved_placeholders: rendered.unresolved,
        })
    }

    fn apply_loop_guard(
        &self,
        session: &mut ConversationSession,
        outcome: StepOutcome,
    ) -> StepOutcome {
        if session.is_active() && session.step_count > self.options.max_steps {
            tracing::warn!(
                session_id = %session.session_id,
                node_id = %session.current_node_id,
                max_steps = self.options.max_steps,
                "loop limit exceeded"
            );
            session.status = SessionStatus::Failed;
            return StepOutcome::LoopLimitExceeded;
        }
        outcome
    }
}

/// Follows Message transitions from `node` to the first Decision or Terminal
/// node, pushing every node entered on the way. Message-only cycles are
/// rejected at load, so the walk ends.
fn follow_messages<'a>(
    script: &'a Script,
    node: &'a Node,
    entered: &mut Vec<&'a Node>,
) -> Result<&'a Node, InvalidStateReason> {
    let mut current = node;
    while current.kind() == NodeKind::Message {
        let transition = current
            .transitions()
            .first()
            .ok_or(InvalidStateReason::UnknownNode)?;
        current = script
            .node(transition.target_node_id())
            .ok_or(InvalidStateReason::UnknownNode)?;
        entered.push(current);
    }
    Ok(current)
}

fn enter_nodes(session: &mut ConversationSession, nodes: &[&Node]) {
    for node in nodes {
        session.current_node_id = node.id().to_string();
        session.visited_node_ids.push(node.id().to_string());
    }
}

/// Renders each node's template and joins the non-empty texts with newlines.
fn render_chain(
    script: &Script,
    bindings: &BTreeMap<String, DmValue>,
    nodes: &[&Node],
    warnings: &mut Vec<StepWarning>,
) -> Rendered {
    let mut texts = Vec::new();
    let mut unresolved: Vec<String> = Vec::new();
    for node in nodes {
        let rendered = render(node.template(), bindings, script.variables());
        for name in rendered.unresolved {
            warnings.push(StepWarning::UnresolvedPlaceholder {
                node_id: node.id().to_string(),
                name: name.clone(),
            });
            if !unresolved.contains(&name) {
                unresolved.push(name);
            }
        }
        if !rendered.text.is_empty() {
            texts.push(rendered.text);
        }
    }
    Rendered {
        text: texts.join("\n"),
        unresolved,
    }
}

fn merge_captures(
    script: &Script,
    session: &mut ConversationSession,
    captures: Vec<(String, String)>,
    warnings: &mut Vec<StepWarning>,
) {
    for (name, raw_value) in captures {
        let Some(decl) = script.variable(&name) else {
            continue;
        };
        match bind(&name, &raw_value, decl) {
            Ok(value) => {
                session.bindings.insert(name, value);
            }
            Err(mismatch) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    variable = %mismatch.variable,
                    expected = %mismatch.expected,
                    "capture rejected: {}",
                    mismatch
                );
                warnings.push(mismatch.into());
            }
        }
    }
}

pub fn create_session(script: &Script, session_id: impl Into<String>) -> ConversationSession {
    ConversationSession {
        session_id: session_id.into(),
        script_id: script.id().to_string(),
        script_version: script.version(),
        current_node_id: script.entry_node_id().to_string(),
        bindings: BTreeMap::new(),
        visited_node_ids: vec![script.entry_node_id().to_string()],
        status: SessionStatus::Active,
        step_count: 0,
    }
}

pub fn create_session_with_bindings(
    script: &Script,
    session_id: impl Into<String>,
    seeds: &BTreeMap<String, String>,
) -> Result<ConversationSession, DmScriptError> {
    let mut session = create_session(script, session_id);
    for (name, raw_value) in seeds {
        let decl = script.variable(name).ok_or_else(|| {
            DmScriptError::new(
                "SESSION_SEED_UNDECLARED",
                format!(
                    "Seed binding \"{}\" is not declared by script \"{}\".",
                    name,
                    script.id()
                ),
            )
        })?;
        let value = bind(name, raw_value, decl)
            .map_err(|mismatch| DmScriptError::new("SESSION_SEED_TYPE", mismatch.to_string()))?;
        session.bindings.insert(name.clone(), value);
    }
    Ok(session)
}

/// Renders the current node without advancing: the opening message of a fresh
/// session, or the re-prompt after `AwaitingInput`. An entry Message chain is
/// rendered through to the Decision node it leads to; a Terminal at the end of
/// that chain is left for the step that completes the session.
pub fn current_prompt(
    script: &Script,
    session: &ConversationSession,
) -> Result<Rendered, DmScriptError> {
    let node = get_node(script, &session.current_node_id)?;
    let mut nodes = vec![node];
    let resting = follow_messages(script, node, &mut nodes).map_err(|_| {
        DmScriptError::at_node(
            "SCRIPT_NODE_NOT_FOUND",
            format!(
                "Message chain from \"{}\" leads to a missing node.",
                session.current_node_id
            ),
            session.current_node_id.clone(),
        )
    })?;
    if resting.kind() == NodeKind::Terminal && nodes.len() > 1 {
        nodes.pop();
    }
    Ok(render_chain(
        script,
        &session.bindings,
        &nodes,
        &mut Vec::new(),
    ))
}

pub fn step(script: &Script, session: &ConversationSession, input: &str) -> StepResult {
    ConversationExecutor::default().step(script, session, input)
}
