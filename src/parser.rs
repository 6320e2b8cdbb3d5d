//! Parse the textual definition notation into named node trees using PEST.
//!
//! `use Name` references inline a clone of an already-defined symbol. Clones
//! preserve node identity, so every inlined copy of a symbol shares memory
//! slots and bound-variable listeners with the original — referencing a
//! symbol twice is how two parts of a format bind to the same variable.

use crate::node::Variable;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::collections::HashMap;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct DefinitionParser;

/// One named node tree.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub variable: Variable,
}

/// A parsed definition: symbols in declaration order, addressable by name.
#[derive(Debug, Clone)]
pub struct Definition {
    pub symbols: Vec<Symbol>,
    symbols_by_name: HashMap<String, usize>,
}

impl Definition {
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.symbols_by_name
            .get(name)
            .map(|&i| &self.symbols[i].variable)
    }
}

/// Parse definition source into named node trees.
pub fn parse(source: &str) -> Result<Definition, String> {
    let pairs = DefinitionParser::parse(Rule::definition, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let pair = pairs.into_iter().next().ok_or("Empty parse")?;

    let mut symbols: Vec<Symbol> = Vec::new();
    let mut symbols_by_name: HashMap<String, usize> = HashMap::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::symbol_def => {
                let symbol = build_symbol(inner, &symbols, &symbols_by_name)?;
                if symbols_by_name.contains_key(&symbol.name) {
                    return Err(format!("Duplicate symbol name: {}", symbol.name));
                }
                symbols_by_name.insert(symbol.name.clone(), symbols.len());
                symbols.push(symbol);
            }
            Rule::EOI => {}
            _ => {}
        }
    }

    Ok(Definition {
        symbols,
        symbols_by_name,
    })
}

fn build_symbol(
    pair: pest::iterators::Pair<Rule>,
    symbols: &[Symbol],
    symbols_by_name: &HashMap<String, usize>,
) -> Result<Symbol, String> {
    let mut it = pair.into_inner();
    let name_pair = it.next().ok_or("symbol: missing name")?;
    let name = name_pair.as_str().to_string();
    let expr_pair = it.next().ok_or("symbol: missing expression")?;
    let mut variable = build_expr(expr_pair, symbols, symbols_by_name)?;
    variable.set_name(name.clone());
    Ok(Symbol { name, variable })
}

fn build_expr(
    pair: pest::iterators::Pair<Rule>,
    symbols: &[Symbol],
    symbols_by_name: &HashMap<String, usize>,
) -> Result<Variable, String> {
    let inner = pair.into_inner().next().ok_or("expr: empty")?;
    match inner.as_rule() {
        Rule::agg_expr => build_container(inner, symbols, symbols_by_name, true),
        Rule::alt_expr => build_container(inner, symbols, symbols_by_name, false),
        Rule::repeat_expr => build_repeat(inner, symbols, symbols_by_name),
        Rule::data_expr => {
            let s = string_body(inner).ok_or("data: missing literal")?;
            Ok(Variable::fixed("data", s.as_bytes()))
        }
        Rule::hex_expr => {
            let s = string_body(inner).ok_or("hex: missing literal")?;
            let bytes = decode_hex(&s)?;
            Ok(Variable::fixed("hex", bytes))
        }
        Rule::bytes_expr => {
            let range_pair = inner
                .into_inner()
                .find(|p| p.as_rule() == Rule::range)
                .ok_or("bytes: missing range")?;
            let (min, max) = build_range(range_pair)?;
            Ok(Variable::bytes("bytes", min, max))
        }
        Rule::use_expr => {
            let ident = inner
                .into_inner()
                .next()
                .ok_or("use: missing symbol name")?
                .as_str();
            let i = symbols_by_name
                .get(ident)
                .ok_or_else(|| format!("Unknown symbol: {}", ident))?;
            Ok(symbols[*i].variable.clone())
        }
        r => Err(format!("Unexpected expression rule: {:?}", r)),
    }
}

fn build_container(
    pair: pest::iterators::Pair<Rule>,
    symbols: &[Symbol],
    symbols_by_name: &HashMap<String, usize>,
    is_agg: bool,
) -> Result<Variable, String> {
    let mut mutable = false;
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::mutable_kw => mutable = true,
            Rule::expr_list => {
                for expr in inner.into_inner() {
                    children.push(build_expr(expr, symbols, symbols_by_name)?);
                }
            }
            _ => {}
        }
    }
    let mut variable = if is_agg {
        Variable::agg("agg", children)
    } else {
        Variable::alt("alt", children)
    };
    if mutable {
        variable = variable.mutable();
    }
    Ok(variable)
}

fn build_repeat(
    pair: pest::iterators::Pair<Rule>,
    symbols: &[Symbol],
    symbols_by_name: &HashMap<String, usize>,
) -> Result<Variable, String> {
    let mut mutable = false;
    let mut child = None;
    let mut bounds = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::mutable_kw => mutable = true,
            Rule::expr => child = Some(build_expr(inner, symbols, symbols_by_name)?),
            Rule::range => bounds = Some(build_range(inner)?),
            _ => {}
        }
    }
    let child = child.ok_or("repeat: missing child expression")?;
    let (min, max) = bounds.ok_or("repeat: missing range")?;
    let mut variable = Variable::repeat("repeat", child, min, max);
    if mutable {
        variable = variable.mutable();
    }
    Ok(variable)
}

fn build_range(pair: pest::iterators::Pair<Rule>) -> Result<(usize, usize), String> {
    let mut it = pair.into_inner();
    let min_str = it.next().ok_or("range: missing lower bound")?.as_str();
    let max_str = it.next().ok_or("range: missing upper bound")?.as_str();
    let min: usize = min_str
        .parse()
        .map_err(|_| format!("range: bad lower bound: {}", min_str))?;
    let max: usize = max_str
        .parse()
        .map_err(|_| format!("range: bad upper bound: {}", max_str))?;
    if min > max {
        return Err(format!("range: inverted bounds: {}..{}", min, max));
    }
    Ok((min, max))
}

fn string_body(pair: pest::iterators::Pair<Rule>) -> Option<String> {
    let s = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::string)?
        .as_str();
    // Atomic string rule keeps its quotes.
    Some(s[1..s.len() - 1].to_string())
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    if !s.is_ascii() {
        return Err(format!("hex: non-ASCII digits: {:?}", s));
    }
    if s.len() % 2 != 0 {
        return Err(format!("hex: odd number of digits: {:?}", s));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    for i in (0..s.len()).step_by(2) {
        let pair = &s[i..i + 2];
        let byte =
            u8::from_str_radix(pair, 16).map_err(|_| format!("hex: bad digits: {:?}", pair))?;
        out.push(byte);
    }
    Ok(out)
}
