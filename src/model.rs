use serde::Serialize;

/// Opaque Doxygen cross-reference key (a `refid` attribute). Identity for
/// member lookups and alias-table entries; never interpreted structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The member kinds the catalog understands. Anything else in the
/// documentation (defines, friends, ...) is skipped at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Function,
    Variable,
    Enum,
    Namespace,
    Typedef,
}

impl MemberKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "function" => Some(Self::Function),
            "variable" => Some(Self::Variable),
            "enum" => Some(Self::Enum),
            "namespace" => Some(Self::Namespace),
            "typedef" => Some(Self::Typedef),
            _ => None,
        }
    }
}

/// One documented member of a compound. Type spellings stay raw until the
/// global rewrite pass runs; after that they hold canonical Python
/// expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDefinition {
    pub kind: MemberKind,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub params: Vec<Parameter>,
    pub brief: Option<String>,
    pub param_docs: Vec<ParamDoc>,
    pub verbatim: Option<String>,
    pub returns: Option<String>,
}

/// A positional parameter of a member; order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub name: Option<String>,
    pub default: Option<String>,
}

/// An ordered `(name, description)` pair from a member's parameter
/// documentation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
}

/// Per-compound metadata exposed by the query surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundMetadata {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub brief: Option<String>,
}
