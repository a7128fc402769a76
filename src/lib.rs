pub mod cli;
pub mod driver;
pub mod ingest;
pub mod model;
pub mod registry;
pub mod rewrite;
pub mod utils;
pub mod xml;

pub use driver::{ApiIndex, DriverError, load_directory};
pub use model::{CompoundMetadata, MemberDefinition, MemberId, MemberKind, ParamDoc, Parameter};
pub use registry::{AliasTable, ResolutionContext, ResolvedTables};
pub use rewrite::{ResolutionError, Rewrite, rewrite_type};
pub use xml::ParseError;
