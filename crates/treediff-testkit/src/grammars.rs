//! Toy grammars for diff tests.

use std::sync::Arc;
use treediff_tree::{FieldId, Language, LanguageBuilder, LiteralMap, Symbol, TreeResult};

/// The minimal arithmetic grammar: every symbol is visible, interior rules
/// are named, and `integer`/`identifier` are declared literals.
pub struct Arith {
    pub language: Arc<Language>,
    pub literal_map: LiteralMap,
    pub expr: Symbol,
    pub seq: Symbol,
    pub add: Symbol,
    pub call: Symbol,
    pub args: Symbol,
    pub integer: Symbol,
    pub identifier: Symbol,
    pub plus: Symbol,
}

/// Builds the arithmetic grammar.
pub fn arith() -> TreeResult<Arith> {
    let mut builder = LanguageBuilder::new("arith");
    let expr = builder.named_symbol("expr")?;
    let seq = builder.named_symbol("seq")?;
    let add = builder.named_symbol("add")?;
    let call = builder.named_symbol("call")?;
    let args = builder.named_symbol("args")?;
    let integer = builder.named_symbol("integer")?;
    let identifier = builder.named_symbol("identifier")?;
    let plus = builder.token_symbol("+")?;
    let language = Arc::new(builder.build());

    let mut literal_map = LiteralMap::new(&language);
    literal_map.add_literal(integer)?;
    literal_map.add_literal(identifier)?;
    literal_map.add_unnamed_token(plus)?;

    Ok(Arith { language, literal_map, expr, seq, add, call, args, integer, identifier, plus })
}

/// A grammar exercising the relevance filter: an invisible wrapper rule, an
/// anonymous punctuation token that is *not* a declared unnamed token, a
/// comment extra, and declared fields.
pub struct Tokens {
    pub language: Arc<Language>,
    pub literal_map: LiteralMap,
    pub stmt: Symbol,
    /// Invisible rule; never appears in edit scripts.
    pub wrapper: Symbol,
    pub name: Symbol,
    /// Anonymous and undeclared, hence irrelevant.
    pub punct: Symbol,
    /// Anonymous but declared relevant.
    pub arrow: Symbol,
    pub comment: Symbol,
    pub field_target: FieldId,
}

/// Builds the token-relevance grammar. Production 1 of `stmt` declares its
/// first child as the `target` field.
pub fn tokens() -> TreeResult<Tokens> {
    let mut builder = LanguageBuilder::new("tokens");
    let stmt = builder.named_symbol("stmt")?;
    let wrapper = builder.symbol("_wrapper", true, false)?;
    let name = builder.named_symbol("name")?;
    let punct = builder.token_symbol(";")?;
    let arrow = builder.token_symbol("->")?;
    let comment = builder.named_symbol("comment")?;
    let field_target = builder.field("target")?;
    builder.map_field(1, 0, field_target)?;
    let language = Arc::new(builder.build());

    let mut literal_map = LiteralMap::new(&language);
    literal_map.add_literal(name)?;
    literal_map.add_literal(comment)?;
    literal_map.add_unnamed_token(arrow)?;

    Ok(Tokens { language, literal_map, stmt, wrapper, name, punct, arrow, comment, field_target })
}
