//! Placeholder discovery.
//!
//! A read-only walk over the parsed module. Matching elements are reported in
//! document order, nested placeholders included; nothing is mutated here.

use oxc::ast::ast::{
    JSXAttribute, JSXAttributeItem, JSXAttributeName, JSXAttributeValue, JSXElementName,
    JSXExpression, JSXOpeningElement, Program,
};
use oxc::ast_visit::{Visit, walk};
use oxc::span::Span;

use crate::image::RequestedSize;

/// A placeholder element found in the module.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Span of the opening element; identifies the element in the tree.
    pub span: Span,
    /// Literal value of the `src` attribute.
    pub src: String,
    /// Numeric `width`/`height` given on the element.
    pub requested: RequestedSize,
}

/// Find every `<tag src="...">` element in `program`.
///
/// Elements without `src`, or whose `src` is not a string literal, are skipped.
pub fn locate(program: &Program<'_>, tag: &str) -> Vec<Placeholder> {
    let mut locator = Locator {
        tag,
        found: Vec::new(),
    };
    locator.visit_program(program);
    locator.found
}

struct Locator<'t> {
    tag: &'t str,
    found: Vec<Placeholder>,
}

impl<'a> Visit<'a> for Locator<'_> {
    fn visit_jsx_opening_element(&mut self, it: &JSXOpeningElement<'a>) {
        if element_name(&it.name) == Some(self.tag)
            && let Some(src) = find_attribute(&it.attributes, "src")
            && let Some(JSXAttributeValue::StringLiteral(lit)) = &src.value
        {
            self.found.push(Placeholder {
                span: it.span,
                src: lit.value.to_string(),
                requested: RequestedSize::new(
                    find_attribute(&it.attributes, "width").and_then(numeric_value),
                    find_attribute(&it.attributes, "height").and_then(numeric_value),
                ),
            });
        }
        walk::walk_jsx_opening_element(self, it);
    }
}

/// Plain tag name (`Sim`, `img`); member and namespaced names yield `None`.
fn element_name<'b>(name: &'b JSXElementName<'_>) -> Option<&'b str> {
    match name {
        JSXElementName::Identifier(ident) => Some(ident.name.as_str()),
        JSXElementName::IdentifierReference(ident) => Some(ident.name.as_str()),
        _ => None,
    }
}

/// Name of a plain attribute; spreads and namespaced names yield `None`.
pub(super) fn attribute_name<'b>(item: &'b JSXAttributeItem<'_>) -> Option<&'b str> {
    match item {
        JSXAttributeItem::Attribute(attr) => match &attr.name {
            JSXAttributeName::Identifier(ident) => Some(ident.name.as_str()),
            JSXAttributeName::NamespacedName(_) => None,
        },
        JSXAttributeItem::SpreadAttribute(_) => None,
    }
}

/// Position of the first attribute called `name`.
pub(super) fn attribute_index(items: &[JSXAttributeItem<'_>], name: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| attribute_name(item) == Some(name))
}

fn find_attribute<'b, 'a>(
    items: &'b [JSXAttributeItem<'a>],
    name: &str,
) -> Option<&'b JSXAttribute<'a>> {
    match &items[attribute_index(items, name)?] {
        JSXAttributeItem::Attribute(attr) => Some(attr),
        JSXAttributeItem::SpreadAttribute(_) => None,
    }
}

/// `{200}` or `"200"`. Anything dynamic is treated as not given.
fn numeric_value(attr: &JSXAttribute<'_>) -> Option<f64> {
    match attr.value.as_ref()? {
        JSXAttributeValue::ExpressionContainer(container) => match &container.expression {
            JSXExpression::NumericLiteral(lit) => Some(lit.value),
            _ => None,
        },
        JSXAttributeValue::StringLiteral(lit) => lit.value.trim().parse().ok(),
        _ => None,
    }
}
