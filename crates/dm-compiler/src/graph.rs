use crate::*;

pub(crate) fn collect_reachable_nodes(
    entry_node_id: &str,
    nodes: &BTreeMap<String, Node>,
) -> BTreeSet<String> {
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::from([entry_node_id.to_string()]);

    while let Some(node_id) = queue.pop_front() {
        if !visited.insert(node_id.clone()) {
            continue;
        }
        if let Some(node) = nodes.get(&node_id) {
            for transition in &node.transitions {
                if !visited.contains(&transition.target_node_id) {
                    queue.push_back(transition.target_node_id.clone());
                }
            }
        }
    }

    visited
}

pub(crate) fn collect_graph_warnings(
    entry_node_id: &str,
    nodes: &BTreeMap<String, Node>,
) -> Vec<ValidationWarning> {
    let reachable = collect_reachable_nodes(entry_node_id, nodes);
    let mut warnings = Vec::new();

    for node in nodes.values() {
        if !reachable.contains(&node.id) {
            warnings.push(ValidationWarning {
                kind: ValidationWarningKind::UnreachableNode,
                message: format!(
                    "Node \"{}\" is not reachable from entry \"{}\".",
                    node.id, entry_node_id
                ),
                node_id: node.id.clone(),
            });
        }
        if node.kind == NodeKind::Decision && node.transitions.is_empty() {
            warnings.push(ValidationWarning {
                kind: ValidationWarningKind::DeadEndDecision,
                message: format!(
                    "Decision node \"{}\" has no transitions and can never advance.",
                    node.id
                ),
                node_id: node.id.clone(),
            });
        }
    }

    warnings
}

/// Message nodes advance without waiting for input, so a loop made only of
/// Message nodes would never rest. Each such loop is reported once, anchored
/// on its smallest node id.
pub(crate) fn collect_message_cycles(nodes: &BTreeMap<String, Node>) -> Vec<ValidationError> {
    let mut anchors = BTreeSet::new();
    let mut errors = Vec::new();

    for start in nodes.values() {
        let mut path: Vec<&str> = Vec::new();
        let mut current = Some(start);
        while let Some(node) = current.filter(|node| node.kind == NodeKind::Message) {
            if let Some(position) = path.iter().position(|id| *id == node.id) {
                let cycle = &path[position..];
                if let Some(anchor) = cycle.iter().min().copied() {
                    if anchors.insert(anchor.to_string()) {
                        errors.push(ValidationError::at_node(
                            ValidationErrorKind::MessageCycle,
                            format!(
                                "Message nodes {} -> {} loop without waiting for input.",
                                cycle.join(" -> "),
                                node.id
                            ),
                            anchor,
                        ));
                    }
                }
                break;
            }
            path.push(&node.id);
            current = node
                .transitions
                .first()
                .and_then(|transition| nodes.get(&transition.target_node_id));
        }
    }

    errors
}
