//! The XPath 1.0 core function library.
//!
//! Implementations are grouped by domain; `default_registry` assembles them
//! under the empty namespace. Arity ranges live in the registry, so an
//! implementation can trust its argument count.

mod boolean;
mod node_set;
mod numeric;
mod strings;

use crate::engine::runtime::FunctionRegistry;
use crate::model::DomNode;

/// Registry preloaded with the complete XPath 1.0 library.
pub fn default_registry<N: DomNode + 'static>() -> FunctionRegistry<N> {
    let mut reg = FunctionRegistry::new();

    reg.register_local("last", 0, Some(0), node_set::last_fn);
    reg.register_local("position", 0, Some(0), node_set::position_fn);
    reg.register_local("count", 1, Some(1), node_set::count_fn);
    reg.register_local("id", 1, Some(1), node_set::id_fn);
    reg.register_local("local-name", 0, Some(1), node_set::local_name_fn);
    reg.register_local("namespace-uri", 0, Some(1), node_set::namespace_uri_fn);
    reg.register_local("name", 0, Some(1), node_set::name_fn);
    reg.register_local("sum", 1, Some(1), node_set::sum_fn);

    reg.register_local("string", 0, Some(1), strings::string_fn);
    reg.register_local("concat", 2, None, strings::concat_fn);
    reg.register_local("starts-with", 2, Some(2), strings::starts_with_fn);
    reg.register_local("contains", 2, Some(2), strings::contains_fn);
    reg.register_local("substring-before", 2, Some(2), strings::substring_before_fn);
    reg.register_local("substring-after", 2, Some(2), strings::substring_after_fn);
    reg.register_local("substring", 2, Some(3), strings::substring_fn);
    reg.register_local("string-length", 0, Some(1), strings::string_length_fn);
    reg.register_local("normalize-space", 0, Some(1), strings::normalize_space_fn);
    reg.register_local("translate", 3, Some(3), strings::translate_fn);

    reg.register_local("boolean", 1, Some(1), boolean::boolean_fn);
    reg.register_local("not", 1, Some(1), boolean::not_fn);
    reg.register_local("true", 0, Some(0), boolean::true_fn);
    reg.register_local("false", 0, Some(0), boolean::false_fn);
    reg.register_local("lang", 1, Some(1), boolean::lang_fn);

    reg.register_local("number", 0, Some(1), numeric::number_fn);
    reg.register_local("floor", 1, Some(1), numeric::floor_fn);
    reg.register_local("ceiling", 1, Some(1), numeric::ceiling_fn);
    reg.register_local("round", 1, Some(1), numeric::round_fn);

    reg
}

/// Normalize per XML whitespace: collapse runs of space, tab, CR and LF to
/// single spaces and strip the ends. Shared by `normalize-space` and `id`.
pub(crate) fn xml_whitespace_tokens(s: &str) -> Vec<&str> {
    s.split([' ', '\t', '\r', '\n'])
        .filter(|t| !t.is_empty())
        .collect()
}
