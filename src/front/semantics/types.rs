//! Expression typing: validity, the numeric predicates, assignability, and
//! operator result types.

use crate::front::ast::{BaseType, BinOp, UnOp};

/// Transient type of an expression during analysis. `None` marks a type that
/// is already known to be wrong; checks that receive an invalid operand stay
/// silent so one defect does not fan out into a cascade of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    base: Option<BaseType>,
}

impl TypeInfo {
    pub fn of(base: BaseType) -> Self {
        Self { base: Some(base) }
    }

    pub fn invalid() -> Self {
        Self { base: None }
    }

    pub fn base(self) -> Option<BaseType> {
        self.base
    }

    pub fn is_valid(self) -> bool {
        self.base.is_some()
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self.base,
            Some(BaseType::Int | BaseType::Char | BaseType::Float | BaseType::Double)
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(self.base, Some(BaseType::Int | BaseType::Char))
    }

    /// Valid types assign to themselves, and any numeric type to any other
    /// numeric type (implicit widening and narrowing both pass; warnings are
    /// deferred).
    pub fn can_assign_to(self, target: TypeInfo) -> bool {
        match (self.base, target.base) {
            (Some(from), Some(to)) => from == to || (self.is_numeric() && target.is_numeric()),
            _ => false,
        }
    }

    /// Name as it appears in diagnostics; empty for an invalid type.
    pub fn name(self) -> &'static str {
        self.base.map(BaseType::name).unwrap_or("")
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the operand types are acceptable for `op`. Both operands must be
/// valid; arithmetic and comparison require numeric operands, the logical
/// operators accept anything.
pub fn binary_operands_ok(op: BinOp, lhs: TypeInfo, rhs: TypeInfo) -> bool {
    if !lhs.is_valid() || !rhs.is_valid() {
        return false;
    }
    if op.is_logical() {
        return true;
    }
    lhs.is_numeric() && rhs.is_numeric()
}

/// Result type of a valid binary operation. Comparisons and logical
/// operators yield `int`; arithmetic follows the promotion ladder
/// double > float > int (char promotes to int).
pub fn binary_result(op: BinOp, lhs: TypeInfo, rhs: TypeInfo) -> TypeInfo {
    if op.is_comparison() || op.is_logical() {
        return TypeInfo::of(BaseType::Int);
    }
    if lhs.base() == Some(BaseType::Double) || rhs.base() == Some(BaseType::Double) {
        return TypeInfo::of(BaseType::Double);
    }
    if lhs.base() == Some(BaseType::Float) || rhs.base() == Some(BaseType::Float) {
        return TypeInfo::of(BaseType::Float);
    }
    TypeInfo::of(BaseType::Int)
}

/// `-`/`+` require a numeric operand; `!` accepts any valid operand.
pub fn unary_operand_ok(op: UnOp, operand: TypeInfo) -> bool {
    if !operand.is_valid() {
        return false;
    }
    match op {
        UnOp::Neg | UnOp::Plus => operand.is_numeric(),
        UnOp::Not => true,
    }
}
