//! Attribute rewriting for resolved placeholders.
//!
//! For every resolved element, in this order:
//! 1. ensure a `width` attribute exists (`width={0}` appended if missing)
//! 2. ensure a `height` attribute exists (`height={0}` appended if missing)
//! 3. write the resolved numbers into those attribute nodes
//! 4. replace the literal value of `src` with the final URL
//! 5. set `color={"rgb(r, g, b)"}`, appending it if missing
//!
//! Existing nodes are updated in place and no attribute is removed, so an
//! element never ends up with two attributes of the same name.

use oxc::allocator::Allocator;
use oxc::ast::AstBuilder;
use oxc::ast::ast::{
    JSXAttributeItem, JSXAttributeValue, JSXExpression, JSXOpeningElement, Program,
};
use oxc::ast_visit::{VisitMut, walk_mut};
use oxc::span::{SPAN, Span};
use oxc::syntax::number::NumberBase;
use rustc_hash::FxHashMap;

use super::locate::attribute_index;
use crate::image::Layout;

/// Rewrite every element whose opening span has an entry in `resolved`.
pub fn apply<'a>(allocator: &'a Allocator, program: &mut Program<'a>, resolved: FxHashMap<Span, Layout>) {
    if resolved.is_empty() {
        return;
    }
    let mut mutator = Mutator {
        ast: AstBuilder::new(allocator),
        resolved,
    };
    mutator.visit_program(program);
}

struct Mutator<'a> {
    ast: AstBuilder<'a>,
    resolved: FxHashMap<Span, Layout>,
}

impl<'a> VisitMut<'a> for Mutator<'a> {
    fn visit_jsx_opening_element(&mut self, it: &mut JSXOpeningElement<'a>) {
        if let Some(layout) = self.resolved.remove(&it.span) {
            self.rewrite(it, &layout);
        }
        walk_mut::walk_jsx_opening_element(self, it);
    }
}

impl<'a> Mutator<'a> {
    fn rewrite(&self, element: &mut JSXOpeningElement<'a>, layout: &Layout) {
        let attributes = &mut element.attributes;

        let width = self.ensure_number(attributes, "width");
        let height = self.ensure_number(attributes, "height");
        self.set_number(&mut attributes[width], layout.width);
        self.set_number(&mut attributes[height], layout.height);

        if let Some(src) = attribute_index(attributes, "src")
            && let JSXAttributeItem::Attribute(attr) = &mut attributes[src]
            && let Some(JSXAttributeValue::StringLiteral(lit)) = &mut attr.value
        {
            lit.value = self.ast.atom(&layout.url);
            lit.raw = None;
        }

        let color = layout.color.to_string();
        match attribute_index(attributes, "color") {
            Some(index) => {
                if let JSXAttributeItem::Attribute(attr) = &mut attributes[index] {
                    attr.value = Some(self.string_value(&color));
                }
            }
            None => attributes.push(self.attribute("color", self.string_value(&color))),
        }
    }

    /// Index of attribute `name`, appending `name={0}` first if absent.
    fn ensure_number(
        &self,
        attributes: &mut oxc::allocator::Vec<'a, JSXAttributeItem<'a>>,
        name: &'static str,
    ) -> usize {
        if let Some(index) = attribute_index(attributes, name) {
            return index;
        }
        attributes.push(self.attribute(name, self.number_value(0.0)));
        attributes.len() - 1
    }

    /// Update a numeric literal in place, or replace whatever value is there.
    fn set_number(&self, item: &mut JSXAttributeItem<'a>, value: f64) {
        let JSXAttributeItem::Attribute(attr) = item else {
            return;
        };
        if let Some(JSXAttributeValue::ExpressionContainer(container)) = &mut attr.value
            && let JSXExpression::NumericLiteral(lit) = &mut container.expression
        {
            lit.value = value;
            lit.raw = None;
            lit.base = NumberBase::Decimal;
            return;
        }
        attr.value = Some(self.number_value(value));
    }

    fn attribute(&self, name: &'static str, value: JSXAttributeValue<'a>) -> JSXAttributeItem<'a> {
        self.ast.jsx_attribute_item_attribute(
            SPAN,
            self.ast.jsx_attribute_name_identifier(SPAN, name),
            Some(value),
        )
    }

    /// `{value}`
    fn number_value(&self, value: f64) -> JSXAttributeValue<'a> {
        let literal = self
            .ast
            .alloc_numeric_literal(SPAN, value, None, NumberBase::Decimal);
        self.ast
            .jsx_attribute_value_expression_container(SPAN, JSXExpression::NumericLiteral(literal))
    }

    /// `{"value"}`
    fn string_value(&self, value: &str) -> JSXAttributeValue<'a> {
        let literal = self.ast.alloc_string_literal(SPAN, self.ast.atom(value), None);
        self.ast
            .jsx_attribute_value_expression_container(SPAN, JSXExpression::StringLiteral(literal))
    }
}
