//! Built-in renderer for the ERB subset used by bpm templates.
//!
//! Supported tags:
//!
//! ```text
//! <%= p("a.b") %>            property, error when unset
//! <%= p("a.b", "fallback") %> property with a literal fallback
//! <%= spec.address %>        instance fact (address, az, id, index, name,
//!                            deployment, bootstrap)
//! <%# comment %>             dropped
//! ... -%>                    also swallows the following newline
//! ```
//!
//! Arbitrary Ruby code blocks are rejected rather than ignored.

use thiserror::Error;

use crate::ports::renderer::{InstanceInfo, RenderRequest, TemplateRenderer};
use crate::property::{PropertyTree, PropertyValue};

/// Renderer for `<%= p(...) %>` / `<%= spec.* %>` templates.
pub struct ErbRenderer;

impl TemplateRenderer for ErbRenderer {
    fn render(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(render_template(request.template, request.properties, request.instance)?)
    }
}

/// Failures of the built-in renderer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `<%` without its closing `%>`.
    #[error("unterminated tag at byte {0}")]
    Unterminated(usize),
    /// A code block other than `<%=` or `<%#`.
    #[error("unsupported code block `{0}`")]
    UnsupportedBlock(String),
    /// An expression outside the supported subset.
    #[error("unsupported expression `{0}`")]
    UnsupportedExpression(String),
    /// `p()` of a property that is unset and has no fallback.
    #[error("can't find property '{0}'")]
    MissingProperty(String),
    /// `spec.<field>` with an unknown field.
    #[error("unknown instance field spec.{0}")]
    UnknownField(String),
    /// A property value that could not be formatted.
    #[error("cannot format property '{path}': {message}")]
    Format {
        /// Property path.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

fn render_template(
    template: &str,
    properties: &PropertyTree,
    instance: &InstanceInfo,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("<%") {
        out.push_str(&rest[..start]);
        let position = template.len() - rest.len() + start;
        let tag = &rest[start + 2..];
        let end = tag.find("%>").ok_or(TemplateError::Unterminated(position))?;
        let (body, trim_newline) = match tag[..end].strip_suffix('-') {
            Some(body) => (body, true),
            None => (&tag[..end], false),
        };

        if let Some(expression) = body.strip_prefix('=') {
            out.push_str(&evaluate(expression.trim(), properties, instance)?);
        } else if !body.starts_with('#') {
            return Err(TemplateError::UnsupportedBlock(body.trim().to_string()));
        }

        rest = &tag[end + 2..];
        if trim_newline {
            rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')).unwrap_or(rest);
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn evaluate(
    expression: &str,
    properties: &PropertyTree,
    instance: &InstanceInfo,
) -> Result<String, TemplateError> {
    if let Some(field) = expression.strip_prefix("spec.") {
        return instance_field(field, instance);
    }
    let unsupported = || TemplateError::UnsupportedExpression(expression.to_string());
    let args = expression
        .strip_prefix("p(")
        .and_then(|inner| inner.strip_suffix(')'))
        .ok_or_else(unsupported)?;
    let (path, fallback) = parse_arguments(args).ok_or_else(unsupported)?;

    let value = match properties.lookup(&path).filter(|value| !value.is_null()) {
        Some(value) => value,
        None => fallback.as_ref().ok_or_else(|| TemplateError::MissingProperty(path.clone()))?,
    };
    format_value(&path, value)
}

fn instance_field(field: &str, instance: &InstanceInfo) -> Result<String, TemplateError> {
    let value = match field {
        "address" => instance.address.clone(),
        "az" => instance.az.clone(),
        "id" => instance.id.clone(),
        "index" => instance.index.clone(),
        "name" => instance.name.clone(),
        "deployment" => instance.deployment.clone(),
        "bootstrap" => instance.bootstrap.to_string(),
        other => return Err(TemplateError::UnknownField(other.to_string())),
    };
    Ok(value)
}

/// Parses `"path"` or `"path", <literal>`.
fn parse_arguments(args: &str) -> Option<(String, Option<PropertyValue>)> {
    let (path, rest) = parse_quoted(args.trim())?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Some((path, None));
    }
    let literal = parse_literal(rest.strip_prefix(',')?.trim())?;
    Some((path, Some(literal)))
}

fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let quote = input.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &input[1..];
    let end = body.find(quote)?;
    Some((body[..end].to_string(), &body[end + 1..]))
}

fn parse_literal(text: &str) -> Option<PropertyValue> {
    if let Some((value, rest)) = parse_quoted(text) {
        return rest.trim().is_empty().then_some(PropertyValue::String(value));
    }
    match text {
        "nil" => Some(PropertyValue::Null),
        "true" => Some(PropertyValue::Bool(true)),
        "false" => Some(PropertyValue::Bool(false)),
        _ => {
            if let Ok(int) = text.parse::<i64>() {
                Some(PropertyValue::Number(int.into()))
            } else {
                text.parse::<f64>().ok().map(|float| PropertyValue::Number(float.into()))
            }
        }
    }
}

fn format_value(path: &str, value: &PropertyValue) -> Result<String, TemplateError> {
    if let Some(text) = value.scalar_text() {
        return Ok(if value.is_null() { String::new() } else { text });
    }
    serde_json::to_string(value)
        .map_err(|e| TemplateError::Format { path: path.to_string(), message: e.to_string() })
}
