use crate::{
    error::{Error, Result},
    file::FileData,
    store::HeaderField,
};
use serde::Serialize;
use std::{collections::HashMap, path::Path};
use tera::{Context, Tera, Value};

const BUILTIN_TEMPLATE: &str = "document.md";
const CUSTOM_TEMPLATE: &str = "custom";

/// Fixed instructions opening every document.
pub const PREAMBLE: &str = "This file represents the entire codebase I am working on, it is structured in markdown syntax for readability and to explore codes and my routes relatively easily.";

#[derive(Serialize)]
struct DocumentContext<'a> {
    preamble: &'a str,
    general: &'a [HeaderField],
    show_routes: bool,
    routes: Vec<RouteView<'a>>,
    files: Vec<FileView<'a>>,
    metadata: ContextMetadata,
}

#[derive(Serialize)]
struct RouteView<'a> {
    path: &'a str,
    tokens: usize,
}

#[derive(Serialize)]
struct FileView<'a> {
    path: &'a str,
    content: &'a str,
    token_count: usize,
    lines: usize,
}

#[derive(Serialize)]
struct ContextMetadata {
    file_count: usize,
    generated_by: &'static str,
}

/// Renders assembled files into the final document.
pub(crate) struct TemplateEngine {
    tera: Tera,
    template_name: &'static str,
}

impl TemplateEngine {
    /// Creates an engine using the built-in layout, or `template_path` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a template cannot be read or parsed.
    pub(crate) fn new(template_path: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("label", Self::label_filter);

        tera.add_raw_template(BUILTIN_TEMPLATE, include_str!("../templates/document.md.tera"))
            .map_err(|e| Error::template(BUILTIN_TEMPLATE, &e))?;

        let template_name = match template_path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                tera.add_raw_template(CUSTOM_TEMPLATE, &source)
                    .map_err(|e| Error::template(path.display().to_string(), &e))?;
                CUSTOM_TEMPLATE
            }
            None => BUILTIN_TEMPLATE,
        };

        Ok(Self { tera, template_name })
    }

    /// Turns a `snake_case` key into a title-cased label.
    fn label_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        match value.as_str() {
            Some(key) => Ok(Value::String(field_label(key))),
            None => Ok(value.clone()),
        }
    }

    /// Renders the document.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn render(
        &self,
        general: &[HeaderField],
        files: &[FileData],
        show_routes: bool,
    ) -> Result<String> {
        let mut routes: Vec<RouteView<'_>> = files
            .iter()
            .map(|f| RouteView {
                path: &f.relative_path,
                tokens: f.token_count,
            })
            .collect();
        // stable: ties keep document order
        routes.sort_by(|a, b| b.tokens.cmp(&a.tokens));

        let context = DocumentContext {
            preamble: PREAMBLE,
            general,
            show_routes,
            routes,
            files: files
                .iter()
                .map(|f| FileView {
                    path: &f.relative_path,
                    content: &f.content,
                    token_count: f.token_count,
                    lines: f.line_count(),
                })
                .collect(),
            metadata: ContextMetadata {
                file_count: files.len(),
                generated_by: env!("CARGO_PKG_NAME"),
            },
        };

        let mut tera_context = Context::new();
        tera_context.insert("ctx", &context);

        self.tera
            .render(self.template_name, &tera_context)
            .map_err(|e| Error::template(self.template_name, &e))
    }
}

/// Replaces `_` with spaces and title-cases each word.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise, so `api_v2key` becomes `Api V2Key`.
#[must_use]
pub(crate) fn field_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut after_letter = false;

    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if after_letter {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            label.push(c);
            after_letter = false;
        }
    }

    label
}
