use crate::*;

#[derive(Debug, Clone)]
pub struct Script {
    pub(crate) id: String,
    pub(crate) version: u32,
    pub(crate) entry_node_id: String,
    pub(crate) nodes: BTreeMap<String, Node>,
    pub(crate) variables: BTreeMap<String, VariableDecl>,
    pub(crate) warnings: Vec<ValidationWarning>,
}

impl Script {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn entry_node_id(&self) -> &str {
        &self.entry_node_id
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &BTreeMap<String, VariableDecl> {
        &self.variables
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: String,
    pub(crate) kind: NodeKind,
    pub(crate) template: String,
    pub(crate) transitions: Vec<Transition>,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Transitions in evaluation order: ascending priority, authored order on ties.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub(crate) target_node_id: String,
    pub(crate) priority: i32,
    pub(crate) matcher: Matcher,
    pub(crate) captures: Vec<String>,
    pub(crate) intent: Option<String>,
}

impl Transition {
    pub fn target_node_id(&self) -> &str {
        &self.target_node_id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// Lower-cased keywords with whitespace runs collapsed.
    Keyword { keywords: Vec<String> },
    /// Compiled case-insensitive.
    Pattern { regex: Regex },
    CatchAll,
}

impl Matcher {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Keyword { .. } => "keyword",
            Self::Pattern { .. } => "pattern",
            Self::CatchAll => "catchAll",
        }
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn script_is_shareable_across_threads() {
        assert_send_sync::<Script>();
    }

    #[test]
    fn matcher_kind_name_matches_definition_tags() {
        assert_eq!(Matcher::CatchAll.kind_name(), "catchAll");
        assert_eq!(
            Matcher::Keyword {
                keywords: vec!["buy".to_string()]
            }
            .kind_name(),
            "keyword"
        );
    }
}
