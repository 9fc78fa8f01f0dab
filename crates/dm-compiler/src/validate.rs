use crate::graph::{collect_graph_warnings, collect_message_cycles};
use crate::*;

pub(crate) fn build_script(raw: ScriptDefinition) -> Result<Script, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let variables = collect_variables(raw.variables, &mut errors);

    let mut seen_node_ids = BTreeSet::new();
    for node in &raw.nodes {
        if !seen_node_ids.insert(node.id.clone()) {
            errors.push(ValidationError::at_node(
                ValidationErrorKind::DuplicateNodeId,
                format!("Duplicate node id \"{}\".", node.id),
                node.id.clone(),
            ));
        }
    }

    if !seen_node_ids.contains(&raw.entry_node_id) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingEntryNode,
            format!(
                "Entry node \"{}\" is not defined in script \"{}\".",
                raw.entry_node_id, raw.id
            ),
        ));
    }

    let mut nodes = BTreeMap::new();
    for node in raw.nodes {
        let Some(compiled) = compile_node(node, &seen_node_ids, &variables, &mut errors) else {
            continue;
        };
        nodes.entry(compiled.id.clone()).or_insert(compiled);
    }
    errors.extend(collect_message_cycles(&nodes));

    if !errors.is_empty() {
        return Err(errors);
    }

    let warnings = collect_graph_warnings(&raw.entry_node_id, &nodes);
    for warning in &warnings {
        tracing::warn!(
            script_id = %raw.id,
            version = raw.version,
            node_id = %warning.node_id,
            kind = ?warning.kind,
            "{}",
            warning.message
        );
    }

    tracing::debug!(
        script_id = %raw.id,
        version = raw.version,
        nodes = nodes.len(),
        variables = variables.len(),
        "script loaded"
    );

    Ok(Script {
        id: raw.id,
        version: raw.version,
        entry_node_id: raw.entry_node_id,
        nodes,
        variables,
        warnings,
    })
}

fn collect_variables(
    declarations: Vec<VariableDecl>,
    errors: &mut Vec<ValidationError>,
) -> BTreeMap<String, VariableDecl> {
    let mut variables = BTreeMap::new();
    for declaration in declarations {
        if let VariableType::Enum { values } = &declaration.r#type {
            if values.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyEnum,
                    format!("Enum variable \"{}\" declares no values.", declaration.name),
                ));
            }
        }
        if variables.contains_key(&declaration.name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateVariable,
                format!("Duplicate variable \"{}\".", declaration.name),
            ));
            continue;
        }
        variables.insert(declaration.name.clone(), declaration);
    }
    variables
}

fn compile_node(
    node: NodeDefinition,
    node_ids: &BTreeSet<String>,
    variables: &BTreeMap<String, VariableDecl>,
    errors: &mut Vec<ValidationError>,
) -> Option<Node> {
    let error_count = errors.len();

    match node.kind {
        NodeKind::Terminal if !node.transitions.is_empty() => {
            errors.push(ValidationError::at_node(
                ValidationErrorKind::TerminalTransitions,
                format!(
                    "Terminal node \"{}\" must not declare transitions, found {}.",
                    node.id,
                    node.transitions.len()
                ),
                node.id.clone(),
            ));
        }
        NodeKind::Message if node.transitions.len() != 1 => {
            errors.push(ValidationError::at_node(
                ValidationErrorKind::MessageTransitionCount,
                format!(
                    "Message node \"{}\" must declare exactly one transition, found {}.",
                    node.id,
                    node.transitions.len()
                ),
                node.id.clone(),
            ));
        }
        _ => {}
    }

    for name in template_placeholders(&node.template) {
        if !variables.contains_key(name) {
            errors.push(ValidationError::at_node(
                ValidationErrorKind::UndeclaredVariable,
                format!(
                    "Template of node \"{}\" references undeclared variable \"{}\".",
                    node.id, name
                ),
                node.id.clone(),
            ));
        }
    }

    let last_index = node.transitions.len().saturating_sub(1);
    let highest_priority = node
        .transitions
        .iter()
        .filter(|transition| !transition.matcher.is_catch_all())
        .map(|transition| transition.priority)
        .max();

    let mut transitions = Vec::new();
    for (index, transition) in node.transitions.into_iter().enumerate() {
        if transition.matcher.is_catch_all() {
            let out_of_order = highest_priority.is_some_and(|max| transition.priority < max);
            if index != last_index || out_of_order {
                errors.push(ValidationError::at_node(
                    ValidationErrorKind::MisplacedCatchAll,
                    format!(
                        "Catch-all transition #{} of node \"{}\" must be the final transition.",
                        index, node.id
                    ),
                    node.id.clone(),
                ));
            }
        }
        if let Some(compiled) =
            compile_transition(&node.id, index, transition, node_ids, variables, errors)
        {
            transitions.push(compiled);
        }
    }

    if errors.len() > error_count {
        return None;
    }

    transitions.sort_by_key(|transition| transition.priority);

    Some(Node {
        id: node.id,
        kind: node.kind,
        template: node.template,
        transitions,
    })
}

fn compile_transition(
    node_id: &str,
    index: usize,
    transition: TransitionDefinition,
    node_ids: &BTreeSet<String>,
    variables: &BTreeMap<String, VariableDecl>,
    errors: &mut Vec<ValidationError>,
) -> Option<Transition> {
    let error_count = errors.len();

    if !node_ids.contains(&transition.target_node_id) {
        errors.push(ValidationError::at_node(
            ValidationErrorKind::DanglingTarget,
            format!(
                "Transition #{} of node \"{}\" targets unknown node \"{}\".",
                index, node_id, transition.target_node_id
            ),
            node_id,
        ));
    }

    for capture in &transition.captures {
        if !variables.contains_key(capture) {
            errors.push(ValidationError::at_node(
                ValidationErrorKind::UndeclaredVariable,
                format!(
                    "Transition #{} of node \"{}\" captures undeclared variable \"{}\".",
                    index, node_id, capture
                ),
                node_id,
            ));
        }
    }

    let matcher = match transition.matcher {
        MatcherSpec::Keyword { keywords } => {
            let keywords = keywords
                .iter()
                .map(|keyword| collapse_whitespace(keyword).to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect::<Vec<_>>();
            if keywords.is_empty() {
                errors.push(ValidationError::at_node(
                    ValidationErrorKind::EmptyKeywords,
                    format!(
                        "Keyword transition #{} of node \"{}\" has no keywords.",
                        index, node_id
                    ),
                    node_id,
                ));
            }
            Matcher::Keyword { keywords }
        }
        MatcherSpec::Pattern { pattern } => {
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(regex) => {
                    for capture in &transition.captures {
                        let has_group = regex.capture_names().flatten().any(|name| name == capture);
                        if !has_group {
                            errors.push(ValidationError::at_node(
                                ValidationErrorKind::InvalidPattern,
                                format!(
                                    "Pattern \"{}\" on node \"{}\" has no named group \"{}\".",
                                    pattern, node_id, capture
                                ),
                                node_id,
                            ));
                        }
                    }
                    Matcher::Pattern { regex }
                }
                Err(error) => {
                    errors.push(ValidationError::at_node(
                        ValidationErrorKind::InvalidPattern,
                        format!(
                            "Pattern \"{}\" on node \"{}\" does not compile: {}",
                            pattern, node_id, error
                        ),
                        node_id,
                    ));
                    Matcher::CatchAll
                }
            }
        }
        MatcherSpec::CatchAll => Matcher::CatchAll,
    };

    if !transition.captures.is_empty() && !matches!(matcher, Matcher::Pattern { .. }) {
        errors.push(ValidationError::at_node(
            ValidationErrorKind::CaptureWithoutPattern,
            format!(
                "Transition #{} of node \"{}\" declares captures but its {} matcher captures nothing.",
                index,
                node_id,
                matcher.kind_name()
            ),
            node_id,
        ));
    }

    if errors.len() > error_count {
        return None;
    }

    Some(Transition {
        target_node_id: transition.target_node_id,
        priority: transition.priority,
        matcher,
        captures: transition.captures,
        intent: transition.intent,
    })
}
