//! Adapter code generator.
//!
//! Renders one Rust adapter struct per probed component into a single module:
//!
//! - `{Name}Layer` struct capturing keyword arguments
//! - `COMPONENT` and `HYPERPARAMETERS` associated constants, one bounded
//!   [`Domain`](crate::adapter::Domain) per inferred parameter
//! - `new(..)` taking one typed argument per parameter
//! - `LayerWrapper` impl plus one marker impl per resolved base
//! - a trailing `register_all` that registers every adapter
//!
//! The rendered text is parsed with `syn` before it is written, so a bad
//! base name or import path fails here rather than in the consuming crate.

pub mod parents;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, CodegenResult};
use crate::metadata::{Bounds, ParamKind, RangePolicy};
use crate::probe::{ProbeRun, ProbedComponent};

pub use parents::{ParentMappingConfig, ParentMappings, UNIVERSAL_BASES, default_parent_mappings};

/// Strict and reserved Rust keywords that need a raw identifier.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type", "unsafe", "use",
    "where", "while", "yield", "abstract", "become", "do", "final", "macro", "override", "priv",
    "typeof", "unsized", "virtual",
];

/// Code generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// File the module is written to, overwritten on every run.
    pub output: PathBuf,
    /// `use` paths emitted at the top of the module.
    pub imports: Vec<String>,
    /// Ordered pattern → bases table.
    pub parent_mappings: Vec<ParentMappingConfig>,
    /// Bounds declared on generated hyperparameters.
    pub ranges: RangePolicy,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("src/generated/layers.rs"),
            imports: vec![
                "layerscope::adapter::*".into(),
                "layerscope::adapter::nn::*".into(),
            ],
            parent_mappings: default_parent_mappings(),
            ranges: RangePolicy::codegen_default(),
        }
    }
}

/// Renders and writes the adapter module.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    config: CodegenConfig,
    mappings: ParentMappings,
}

impl CodeGenerator {
    pub fn new(config: CodegenConfig) -> CodegenResult<Self> {
        let mappings = ParentMappings::compile(&config.parent_mappings)?;
        Ok(Self { config, mappings })
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Render the module for `run`. Pure; the only varying input is `generated_at`.
    pub fn render(&self, run: &ProbeRun, generated_at: NaiveDateTime) -> CodegenResult<String> {
        let mut out = String::new();
        out.push_str(&format!(
            "// AUTOGENERATED ON {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S%.6f")
        ));
        out.push_str("// DO NOT MODIFY THIS FILE MANUALLY\n\n");
        for import in &self.config.imports {
            out.push_str(&format!("use {import};\n"));
        }
        out.push('\n');

        for component in &run.supported {
            let item = self.render_component(component);
            syn::parse_file(&item).map_err(|e| CodegenError::InvalidOutput {
                message: format!("adapter for `{}`: {e}", component.name()),
            })?;
            out.push_str(&item);
        }
        out.push_str(&render_registration(&run.supported));

        syn::parse_file(&out).map_err(|e| CodegenError::InvalidOutput {
            message: e.to_string(),
        })?;
        Ok(out)
    }

    /// Render with the current local time and overwrite the configured output.
    pub fn write(&self, run: &ProbeRun) -> CodegenResult<PathBuf> {
        let path = self.config.output.clone();
        self.write_to(run, &path)?;
        Ok(path)
    }

    /// Render with the current local time and overwrite `path`.
    pub fn write_to(&self, run: &ProbeRun, path: &Path) -> CodegenResult<()> {
        let source = self.render(run, chrono::Local::now().naive_local())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CodegenError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, source).map_err(|e| CodegenError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            path = %path.display(),
            adapters = run.supported.len(),
            "wrote adapter module"
        );
        Ok(())
    }

    fn render_component(&self, component: &ProbedComponent) -> String {
        let name = component.name();
        let adapter = adapter_name(name);
        let mut taken = HashSet::new();
        let params: Vec<(String, &str, ParamKind)> = component
            .metadata
            .iter()
            .map(|(param, kind)| (unique_ident(param, &mut taken), param, kind))
            .collect();

        let mut out = String::new();
        out.push_str(&format!("/// Adapter for the `{name}` component.\n"));
        out.push_str(&format!("pub struct {adapter} {{\n    kwargs: Kwargs,\n}}\n\n"));

        out.push_str(&format!("impl {adapter} {{\n"));
        out.push_str(&format!("    pub const COMPONENT: &'static str = {name:?};\n"));
        if params.is_empty() {
            out.push_str(
                "    pub const HYPERPARAMETERS: &'static [(&'static str, Domain)] = &[];\n\n",
            );
            out.push_str("    pub fn new() -> Self {\n");
            out.push_str("        Self { kwargs: Kwargs::new() }\n");
            out.push_str("    }\n");
        } else {
            out.push_str("    pub const HYPERPARAMETERS: &'static [(&'static str, Domain)] = &[\n");
            for (_, param, kind) in &params {
                out.push_str(&format!(
                    "        ({param:?}, {}),\n",
                    domain_literal(self.config.ranges.bounds(*kind))
                ));
            }
            out.push_str("    ];\n\n");

            let args: Vec<String> = params
                .iter()
                .map(|(ident, _, kind)| format!("{ident}: {}", arg_type(*kind)))
                .collect();
            out.push_str(&format!("    pub fn new({}) -> Self {{\n", args.join(", ")));
            out.push_str("        let mut kwargs = Kwargs::new();\n");
            for (ident, param, kind) in &params {
                out.push_str(&format!(
                    "        kwargs.insert({param:?}, Scalar::{}({ident}));\n",
                    scalar_variant(*kind)
                ));
            }
            out.push_str("        Self { kwargs }\n");
            out.push_str("    }\n");
        }
        out.push_str("}\n\n");

        for base in self.mappings.resolve(name) {
            if base == "LayerWrapper" {
                out.push_str(&format!("impl LayerWrapper for {adapter} {{\n"));
                out.push_str(
                    "    fn component(&self) -> &str {\n        Self::COMPONENT\n    }\n\n",
                );
                out.push_str("    fn kwargs(&self) -> &Kwargs {\n        &self.kwargs\n    }\n");
                out.push_str("}\n\n");
            } else {
                out.push_str(&format!("impl {base} for {adapter} {{}}\n\n"));
            }
        }
        out
    }
}

fn render_registration(components: &[ProbedComponent]) -> String {
    let registry = if components.is_empty() {
        "_registry"
    } else {
        "registry"
    };
    let mut out = String::new();
    out.push_str("/// Register every generated adapter.\n");
    out.push_str(&format!(
        "pub fn register_all({registry}: &mut AdapterRegistry) {{\n"
    ));
    for component in components {
        let adapter = adapter_name(component.name());
        out.push_str(&format!(
            "    registry.register({adapter:?}, {adapter}::COMPONENT, \
             {adapter}::HYPERPARAMETERS);\n"
        ));
    }
    out.push_str("}\n");
    out
}

/// Name of the adapter struct generated for a component.
pub fn adapter_name(component: &str) -> String {
    format!("{component}Layer")
}

/// Rust identifier for a parameter name.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit gets a `_`
/// prefix, and keywords become raw identifiers. `self`, `Self`, `super` and
/// `crate` cannot be raw, so they get a trailing `_` instead.
fn rust_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    match ident.as_str() {
        "_" | "self" | "Self" | "super" | "crate" => format!("{ident}_"),
        kw if KEYWORDS.contains(&kw) => format!("r#{ident}"),
        _ => ident,
    }
}

/// [`rust_ident`], suffixed with a counter until it is unused in `taken`.
fn unique_ident(name: &str, taken: &mut HashSet<String>) -> String {
    let base = rust_ident(name);
    let mut ident = base.clone();
    let mut n = 1;
    while !taken.insert(ident.clone()) {
        ident = format!("{base}_{n}");
        n += 1;
    }
    ident
}

fn arg_type(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::IntegerLike => "i64",
        ParamKind::RealValued => "f64",
    }
}

fn scalar_variant(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::IntegerLike => "Integer",
        ParamKind::RealValued => "Real",
    }
}

fn domain_literal(bounds: Bounds) -> String {
    match bounds {
        Bounds::Int { min, max } => format!("Domain::Discrete {{ min: {min}, max: {max} }}"),
        Bounds::Real { min, max } => {
            format!("Domain::Continuous {{ min: {min:?}, max: {max:?} }}")
        }
    }
}
