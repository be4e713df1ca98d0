/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The expression node type
/// - declarations: Function prototypes, definitions and top-level items
pub mod ast;
pub mod declarations;
