// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use casewise::runtime::library::{names, reference_assemblies};
use casewise::runtime::{Assemblies, Assembly, TypeBuilder};
use casewise::*;
use serde::Deserialize;
use test_generator::test_resources;

const FILE: &str = "Test0.cs";
const FIXTURES: &str = "Fixtures";

type Pos = (u32, u32);

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct Target {
    on: String,
    name: String,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default)]
    type_args: Vec<String>,
    #[serde(default)]
    params: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Call {
        target: Target,
        at: Pos,
        #[serde(default)]
        instance: Option<Box<Node>>,
        #[serde(default)]
        args: Vec<Node>,
    },
    /// Lambda argument: `Conversion(AnonymousFunction(Block(Return(body))))`.
    Lambda { at: Pos, body: Box<Node> },
    Binary {
        op: BinaryOperatorKind,
        at: Pos,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Null literal unless `string` or `int` is given.
    Literal {
        at: Pos,
        #[serde(default)]
        string: Option<String>,
        #[serde(default)]
        int: Option<i64>,
        #[serde(default, rename = "type")]
        ty: Option<String>,
    },
    Convert {
        #[serde(default)]
        to: Option<String>,
        operand: Box<Node>,
    },
    /// Conversion node that lost its operand.
    EmptyConversion { at: Pos },
    Property {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        at: Pos,
        #[serde(default)]
        instance: Option<Box<Node>>,
    },
    Param {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        at: Pos,
    },
    Local {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        at: Pos,
    },
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct Want {
    rule: String,
    at: Pos,
    #[serde(default)]
    severity: Option<Severity>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    /// Complete tree. Exclusive with `lambda`.
    #[serde(default)]
    tree: Option<Node>,
    /// Body of `t => ...` passed to `<provider>.Where(queryable, ...)`.
    #[serde(default)]
    lambda: Option<Node>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    config: Option<AnalyzerConfig>,
    want: Vec<Want>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn assembly_of(qualified: &str) -> &'static str {
    match qualified {
        "System.Linq.Queryable" => names::LINQ_QUERYABLE,
        "System.Linq.Enumerable" => names::LINQ,
        "System.Linq.IQueryable" => names::LINQ_EXPRESSIONS,
        _ if qualified.starts_with("System.") => names::RUNTIME_FACADE,
        _ if qualified.starts_with("Fixtures.") => FIXTURES,
        _ => "Test0",
    }
}

fn split_arguments(list: &str) -> Vec<&str> {
    let mut parts = vec![];
    let (mut depth, mut start) = (0usize, 0usize);
    for (idx, ch) in list.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(list[start..idx].trim());
                start = idx + 1;
            }
            _ => (),
        }
    }
    parts.push(list[start..].trim());
    parts
}

/// Parse `Ns.Name`, `Ns.Name<Args, ...>`, `T[]` and bare `T` (type parameter).
fn parse_type(text: &str) -> Result<TypeSymbol> {
    let text = text.trim();
    if let Some(element) = text.strip_suffix("[]") {
        return Ok(TypeSymbol::array(parse_type(element)?));
    }
    let (base, arguments) = match text.find('<') {
        Some(open) => {
            let Some(list) = text[open + 1..].strip_suffix('>') else {
                bail!("unbalanced generic type `{text}`");
            };
            let arguments = split_arguments(list)
                .into_iter()
                .map(parse_type)
                .collect::<Result<Vec<_>>>()?;
            (&text[..open], arguments)
        }
        None => (text, vec![]),
    };
    match base.rsplit_once('.') {
        Some((namespace, name)) => Ok(TypeSymbol::generic(
            namespace,
            name,
            assembly_of(base),
            arguments,
        )),
        None if arguments.is_empty() => Ok(TypeSymbol::type_parameter(base)),
        None => bail!("generic type `{text}` needs a namespace"),
    }
}

fn method(target: &Target) -> Result<MethodSymbol> {
    let parameters = target
        .params
        .iter()
        .enumerate()
        .map(|(idx, ty)| Ok(ParameterSymbol::new(format!("p{idx}"), parse_type(ty)?)))
        .collect::<Result<Vec<_>>>()?;
    let type_arguments = target
        .type_args
        .iter()
        .map(|ty| parse_type(ty))
        .collect::<Result<Vec<_>>>()?;
    Ok(MethodSymbol::new(
        parse_type(&target.on)?,
        target.name.as_str(),
        target.is_static,
        parameters,
    )
    .with_type_arguments(type_arguments))
}

struct Builder {
    tree: OperationTree,
}

impl Builder {
    fn add(
        &mut self,
        kind: OperationKind,
        ty: Option<TypeSymbol>,
        at: Pos,
        children: Vec<OperationId>,
    ) -> Result<OperationId> {
        Ok(self.tree.add(kind, ty, Location::new(FILE, at.0, at.1), children)?)
    }

    fn pos_of(&self, id: OperationId) -> Result<Pos> {
        let location = self
            .tree
            .get(id)
            .ok_or_else(|| anyhow!("unknown operation {id}"))?
            .location();
        Ok((location.line, location.col))
    }

    fn build(&mut self, node: &Node) -> Result<OperationId> {
        match node {
            Node::Call {
                target,
                at,
                instance,
                args,
            } => {
                let mut children = vec![];
                if let Some(instance) = instance {
                    children.push(self.build(instance)?);
                }
                for arg in args {
                    let value = self.build(arg)?;
                    let pos = self.pos_of(value)?;
                    children.push(self.add(OperationKind::Argument, None, pos, vec![value])?);
                }
                let kind = OperationKind::Invocation(method(target)?);
                self.add(kind, Some(parse_type("System.Boolean")?), *at, children)
            }
            Node::Lambda { at, body } => {
                let body = self.build(body)?;
                let pos = self.pos_of(body)?;
                let ret = self.add(OperationKind::Return, None, pos, vec![body])?;
                let block = self.add(OperationKind::Block, None, pos, vec![ret])?;
                let function = self.add(OperationKind::AnonymousFunction, None, *at, vec![block])?;
                self.add(OperationKind::Conversion, None, *at, vec![function])
            }
            Node::Binary {
                op,
                at,
                left,
                right,
            } => {
                let children = vec![self.build(left)?, self.build(right)?];
                let ty = parse_type("System.Boolean")?;
                self.add(OperationKind::BinaryOperator(*op), Some(ty), *at, children)
            }
            Node::Literal {
                at,
                string,
                int,
                ty,
            } => {
                let (value, default_ty) = match (string, int) {
                    (Some(s), None) => (ConstantValue::String(s.as_str().into()), Some("System.String")),
                    (None, Some(i)) => (ConstantValue::Integer(*i), Some("System.Int32")),
                    (None, None) => (ConstantValue::Null, None),
                    _ => bail!("literal has both a string and an int value"),
                };
                let ty = match ty.as_deref().or(default_ty) {
                    Some(ty) => Some(parse_type(ty)?),
                    None => None,
                };
                self.add(OperationKind::Literal(Some(value)), ty, *at, vec![])
            }
            Node::Convert { to, operand } => {
                let operand = self.build(operand)?;
                let pos = self.pos_of(operand)?;
                let ty = to.as_deref().map(parse_type).transpose()?;
                self.add(OperationKind::Conversion, ty, pos, vec![operand])
            }
            Node::EmptyConversion { at } => self.add(OperationKind::Conversion, None, *at, vec![]),
            Node::Property {
                name,
                ty,
                at,
                instance,
            } => {
                let children = match instance {
                    Some(instance) => vec![self.build(instance)?],
                    None => vec![],
                };
                let kind = OperationKind::PropertyReference(name.as_str().into());
                self.add(kind, Some(parse_type(ty)?), *at, children)
            }
            Node::Param { name, ty, at } => {
                let kind = OperationKind::ParameterReference(name.as_str().into());
                self.add(kind, Some(parse_type(ty)?), *at, vec![])
            }
            Node::Local { name, ty, at } => {
                let kind = OperationKind::LocalReference(name.as_str().into());
                self.add(kind, Some(parse_type(ty)?), *at, vec![])
            }
        }
    }
}

/// `<provider>.Where(queryable, t => <body>)`.
fn where_call(provider: &str, body: &Node) -> Result<OperationTree> {
    let mut builder = Builder {
        tree: OperationTree::new(),
    };
    let source = "System.Linq.IQueryable<TestCase.TestType>";
    let target = Target {
        on: provider.to_string(),
        name: "Where".to_string(),
        is_static: true,
        type_args: vec!["TestCase.TestType".to_string()],
        params: vec![source.to_string(), "System.Object".to_string()],
    };
    let queryable = builder.build(&Node::Local {
        name: "queryable".to_string(),
        ty: source.to_string(),
        at: (8, 26),
    })?;
    let queryable = builder.add(OperationKind::Argument, None, (8, 26), vec![queryable])?;
    let body = builder.build(body)?;
    let pos = builder.pos_of(body)?;
    let ret = builder.add(OperationKind::Return, None, pos, vec![body])?;
    let function = builder.add(OperationKind::AnonymousFunction, None, (8, 52), vec![ret])?;
    let lambda = builder.add(OperationKind::Conversion, None, (8, 52), vec![function])?;
    let lambda = builder.add(OperationKind::Argument, None, (8, 52), vec![lambda])?;
    let kind = OperationKind::Invocation(method(&target)?);
    builder.add(kind, None, (8, 26), vec![queryable, lambda])?;
    Ok(builder.tree)
}

/// Library types that analyzed code defines itself.
fn fixtures(assemblies: &Assemblies) -> Result<Assembly> {
    let lookup = |name: &str| {
        assemblies
            .lookup(names::RUNTIME_FACADE, name)
            .ok_or_else(|| anyhow!("{name} missing from reference library"))
    };
    let object = lookup("System.Object")?;
    let collection = lookup("System.Collections.Generic.ICollection`1")?;
    let list = lookup("System.Collections.Generic.List`1")?;
    let string = lookup("System.String")?;
    let int32 = lookup("System.Int32")?;

    let names_type = TypeBuilder::class(FIXTURES, FIXTURES, "NameSet")
        .extends(object.clone())
        .implements(collection.make_generic(&[string.clone()])?)
        .build();
    let counts = TypeBuilder::class(FIXTURES, FIXTURES, "CountSet")
        .extends(object)
        .implements(collection.make_generic(&[int32])?)
        .build();
    let tags = TypeBuilder::class(FIXTURES, FIXTURES, "TagList")
        .extends(list.make_generic(&[string])?)
        .build();
    let queries = TypeBuilder::class(FIXTURES, FIXTURES, "QueryExtensions")
        .extends(lookup("System.Object")?)
        .build();
    Ok(Assembly::new(FIXTURES)
        .with_type(names_type)
        .with_type(counts)
        .with_type(tags)
        .with_type(queries))
}

fn analyzer(config: &AnalyzerConfig) -> Result<Analyzer> {
    let assemblies = reference_assemblies()?;
    let fixtures = fixtures(&assemblies)?;
    let resolver = Arc::new(assemblies.with(fixtures));
    Ok(Analyzer::from_config(config, resolver)?)
}

fn check(case: &TestCase) -> Result<()> {
    let tree = match (&case.tree, &case.lambda) {
        (Some(tree), None) => {
            let mut builder = Builder {
                tree: OperationTree::new(),
            };
            builder.build(tree)?;
            builder.tree
        }
        (None, Some(body)) => where_call(
            case.provider.as_deref().unwrap_or("System.Linq.Queryable"),
            body,
        )?,
        _ => bail!("exactly one of `tree` or `lambda` must be specified"),
    };

    let config = case.config.clone().unwrap_or_default();
    let diagnostics = analyzer(&config)?.analyze_tree(&tree);

    let actual: Vec<(&str, Pos)> = diagnostics
        .iter()
        .map(|d| (d.rule_id, (d.location.line, d.location.col)))
        .collect();
    let expected: Vec<(&str, Pos)> = case.want.iter().map(|w| (w.rule.as_str(), w.at)).collect();
    if actual != expected {
        bail!(
            "\nexpected = {expected:?}\nactual   = {actual:?}\ndiagnostics = {:#?}",
            diagnostics
        );
    }
    for (want, diagnostic) in case.want.iter().zip(&diagnostics) {
        if let Some(severity) = want.severity {
            if diagnostic.severity != severity {
                bail!("{diagnostic}: expected severity {severity}");
            }
        }
    }
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    println!("running {file}");

    for case in &test.cases {
        print!("case {} ", case.note);
        check(case)?;
        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/analyzer/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
fn parses_type_names() -> Result<()> {
    let ty = parse_type("System.Collections.Generic.Dictionary<System.String, System.Collections.Generic.List<System.Int32>>")?;
    assert_eq!(
        ty.to_string(),
        "System.Collections.Generic.Dictionary<System.String, System.Collections.Generic.List<System.Int32>>"
    );
    assert_eq!(ty.assembly(), Some(names::RUNTIME_FACADE));
    assert!(parse_type("TSource")?.kind() == &TypeSymbolKind::TypeParameter);
    assert_eq!(parse_type("Fixtures.NameSet")?.assembly(), Some(FIXTURES));
    assert!(parse_type("System.List<System.String").is_err());
    Ok(())
}
