use crate::error::Result;
use crate::sexpr::SExpr;

/// An entity that lifts from one S-expression form and prints back to it.
pub trait Form: Sized {
    /// Build from `sexpr`, failing with a wrong-form error if its head does not
    /// name this entity. Unknown sub-forms are ignored.
    fn from_tree(sexpr: &SExpr) -> Result<Self>;

    /// Text of this form starting with `indent` spaces, with a trailing line
    /// break when `newline` is set.
    fn emit(&self, indent: usize, newline: bool) -> Result<String>;
}

/// Emit every item on its own line at `indent`.
pub(crate) fn emit_all<T: Form>(out: &mut String, items: &[T], indent: usize) -> Result<()> {
    for item in items {
        out.push_str(&item.emit(indent, true)?);
    }
    Ok(())
}

/// A boolean flag written either bare (`bold`) or as a form (`(bold yes)`).
pub(crate) fn flag_value(item: &SExpr) -> bool {
    match item {
        SExpr::Atom(_) => true,
        SExpr::List(_) => !matches!(item.opt_str_at(1), Some("no")),
    }
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
