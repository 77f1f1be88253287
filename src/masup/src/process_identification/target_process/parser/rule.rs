/// A catalog entry as written in a rules file, before its pattern is compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolRule {
    pub id: String,
    pub regex: String,
    pub name: Option<String>,
    pub nature: Option<String>,
    pub description: Option<String>,
}
