//! C2: grammar rules, directives, and the grammar source-text reader.
//!
//! The reader is a restored feature: the grammar-file format is treated
//! elsewhere as an external interface, but without a concrete reader the
//! end-to-end scenarios this crate is tested against can't be expressed
//! as tests. It is a direct, hand-rolled recursive-descent
//! translation of `hermes_gen/grammar.py`'s `parse_grammar`/`parse_rules`/
//! `parse_terminal`, restructured around a `Vec<char>` cursor instead of a
//! 1-char-lookahead file reader with `unget`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{GrammarError, Result};
use crate::index::{RuleId, RuleVec, SymbolId};
use crate::symbol::{SymbolTable, EMPTY_NAME, RESERVED_LHS_NAMES};

/// Recognized `%directive` names.
pub mod directive {
    pub const HEADER: &str = "header";
    pub const RETURN: &str = "return";
    pub const IGNORE: &str = "ignore";
    pub const IMPORT: &str = "import";
    pub const EMPTY: &str = "empty";
    pub const DEFAULT: &str = "default";
}

/// A production: `lhs -> rhs[0] rhs[1] ... { action }`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
    pub action: String,
    pub line: usize,
    pub file: String,
}

impl Rule {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// Equality is by LHS and RHS sequence only, ignoring id/action/location.
impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}
impl Eq for Rule {}

pub struct Grammar {
    pub rules: RuleVec<Rule>,
    pub symbols: SymbolTable,
    pub directives: IndexMap<String, Vec<String>>,
    pub start: SymbolId,
    /// Terminals in definition order (this fixes the parse table's column
    /// order).
    pub terminal_order: Vec<SymbolId>,
}

impl Grammar {
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn nonterminal_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| !s.is_terminal() && s.id != self.symbols.empty && s.id != self.symbols.error)
            .map(|s| s.id)
            .collect()
    }

    pub fn rules_for(&self, nonterm: SymbolId) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.lhs == nonterm)
    }
}

// ---------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------

struct RawRule {
    nonterm: String,
    symbols: Vec<String>,
    code: String,
    line: usize,
}

struct Builder {
    terminal_names: HashSet<String>,
    terminals: Vec<(String, String)>,
    rule_defs: Vec<RawRule>,
    nonterminals: HashSet<String>,
    nulls: HashSet<String>,
    directives: IndexMap<String, Vec<String>>,
    loaded_files: HashSet<PathBuf>,
    errors: Vec<GrammarError>,
}

impl Builder {
    fn new() -> Self {
        Self {
            terminal_names: HashSet::new(),
            terminals: Vec::new(),
            rule_defs: Vec::new(),
            nonterminals: HashSet::new(),
            nulls: HashSet::new(),
            directives: IndexMap::new(),
            loaded_files: HashSet::new(),
            errors: Vec::new(),
        }
    }
}

struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    file: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &str, file: &'a str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            col: 0,
            file,
        }
    }

    fn get(&mut self) -> Option<char> {
        if self.pos >= self.chars.len() {
            return None;
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn unget(&mut self) {
        debug_assert!(self.pos > 0);
        self.pos -= 1;
        let c = self.chars[self.pos];
        if c == '\n' {
            self.line -= 1;
            // column tracking across a line boundary is only used for
            // diagnostics, so an approximate value is fine here.
            self.col = 0;
        } else {
            self.col = self.col.saturating_sub(1);
        }
    }

    fn loc(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    fn err(&self, message: impl Into<String>) -> GrammarError {
        GrammarError::Syntax {
            file: self.file.to_string(),
            line: self.line,
            col: self.col,
            message: message.into(),
        }
    }

    fn skip_comment(&mut self) {
        match self.get() {
            Some('#') => {
                // block comment `##...##`
                loop {
                    match self.get() {
                        None => break,
                        Some('#') => {
                            if matches!(self.get(), Some('#')) | matches!(self.get(), None) {
                                break;
                            }
                        }
                        Some(_) => {}
                    }
                }
            }
            Some('\n') | None => {}
            Some(_) => loop {
                match self.get() {
                    None | Some('\n') => break,
                    Some(_) => {}
                }
            },
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parses one grammar file's text (not following `%import`) into a
/// [`Builder`], accumulating errors rather than failing on the first one.
fn parse_into(text: &str, file: &str, builder: &mut Builder, import_dir: &Path) {
    let mut c = Cursor::new(text, file);

    loop {
        let next = match c.get() {
            None => break,
            Some(ch) => ch,
        };

        if next == ' ' || next == '\t' || next == '\n' {
            continue;
        }

        if next == '%' {
            match parse_directive(&mut c) {
                Ok((key, val)) => {
                    if key == directive::IMPORT {
                        let path = import_dir.join(val.trim());
                        load_file(&path, builder);
                    } else {
                        builder.directives.entry(key).or_default().push(val);
                    }
                }
                Err(e) => builder.errors.push(e),
            }
            continue;
        }

        if next == '#' {
            c.skip_comment();
            continue;
        }

        if !is_name_char(next) {
            builder.errors.push(c.err(format!("Invalid character '{next}', expected name")));
            continue;
        }

        let mut lhs = String::from(next);
        let mut ok = true;
        loop {
            match c.get() {
                None => {
                    builder.errors.push(c.err("Unexpected EOF"));
                    ok = false;
                    break;
                }
                Some(ch) if ch == ' ' || ch == '\t' || ch == '\n' => break,
                Some(ch) if is_name_char(ch) => lhs.push(ch),
                Some(ch) => {
                    builder.errors.push(c.err(format!("Invalid character '{ch}'")));
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            continue;
        }

        if lhs == EMPTY_NAME {
            builder.errors.push(c.err("LHS cannot be EMPTY"));
            continue;
        }
        if RESERVED_LHS_NAMES.contains(&lhs.as_str()) {
            builder.errors.push(GrammarError::ReservedName {
                file: file.to_string(),
                name: lhs.clone(),
            });
            continue;
        }

        // find '='
        loop {
            match c.get() {
                None => {
                    builder.errors.push(c.err("Unexpected EOF"));
                    return;
                }
                Some('=') => break,
                Some('#') => c.skip_comment(),
                Some(ch) if ch == ' ' || ch == '\t' || ch == '\n' => {}
                Some(ch) => {
                    builder.errors.push(c.err(format!("Invalid character '{ch}', expected '='")));
                    return;
                }
            }
        }

        // peek first meaningful char to decide terminal vs. nonterminal
        let mut is_terminal = false;
        loop {
            match c.get() {
                None => {
                    builder.errors.push(c.err("Unexpected EOF"));
                    return;
                }
                Some(ch) if ch == ' ' || ch == '\t' || ch == '\n' => continue,
                Some(ch) if ch == '"' || ch == '\'' => {
                    is_terminal = true;
                    let quote = ch;
                    if let Some(regex) = parse_terminal(&mut c, quote, &mut builder.errors) {
                        if builder.terminal_names.contains(&lhs) {
                            builder.errors.push(GrammarError::DuplicateTerminal {
                                file: file.to_string(),
                                name: lhs.clone(),
                            });
                        } else {
                            builder.terminal_names.insert(lhs.clone());
                            builder.terminals.push((lhs.clone(), regex));
                        }
                    }
                    break;
                }
                Some(ch) if is_name_char(ch) => {
                    c.unget();
                    break;
                }
                Some('#') => c.skip_comment(),
                Some(ch) => {
                    builder
                        .errors
                        .push(c.err(format!("Invalid character '{ch}', expected terminal or symbol list")));
                    return;
                }
            }
        }

        if is_terminal {
            continue;
        }

        builder.nonterminals.insert(lhs.clone());
        if parse_rules(&mut c, &lhs, file, &mut builder.rule_defs, &mut builder.errors) {
            builder.nulls.insert(lhs);
        }
    }
}

fn parse_directive(c: &mut Cursor) -> std::result::Result<(String, String), GrammarError> {
    let mut key = String::new();
    let mut value = String::new();
    let mut hit_newline = false;

    loop {
        let ch = c.get().ok_or_else(|| c.err("Invalid directive, unexpected EOF"))?;
        if key.is_empty() {
            if !is_name_char(ch) {
                return Err(c.err("Invalid directive, expected directive name"));
            }
            key.push(ch);
            continue;
        }
        if ch == ' ' || ch == '\t' {
            break;
        }
        if ch == '\n' {
            hit_newline = true;
            break;
        }
        if !is_name_char(ch) {
            return Err(c.err(format!("Invalid character '{ch}' in directive name")));
        }
        key.push(ch);
    }

    if hit_newline {
        return Ok((key, value));
    }

    loop {
        let ch = match c.get() {
            None => break,
            Some(ch) => ch,
        };
        if value.is_empty() && (ch == ' ' || ch == '\t') {
            continue;
        }
        if ch != '\n' {
            value.push(ch);
        } else {
            break;
        }
    }

    Ok((key, value.trim().to_string()))
}

fn parse_terminal(c: &mut Cursor, quote: char, errors: &mut Vec<GrammarError>) -> Option<String> {
    let mut out = Vec::new();
    loop {
        let ch = match c.get() {
            None => {
                errors.push(c.err("Unexpected EOF"));
                return None;
            }
            Some(ch) => ch,
        };
        if ch == quote {
            if out.is_empty() {
                errors.push(c.err("Empty terminal regex"));
                return None;
            }
            if out[out.len() - 1] != '\\' {
                break;
            }
            *out.last_mut().unwrap() = ch;
            continue;
        }
        out.push(ch);
    }

    loop {
        match c.get() {
            Some(';') => break,
            Some(ch) if ch == ' ' || ch == '\t' || ch == '\n' => continue,
            Some(ch) => {
                errors.push(c.err(format!("Invalid character '{ch}', expected ';'")));
                return None;
            }
            None => {
                errors.push(c.err("Unexpected EOF"));
                return None;
            }
        }
    }

    Some(out.into_iter().collect())
}

/// Parses all `|`-separated alternatives for one nonterminal, returns
/// `true` if any of them is the bare `EMPTY` production.
fn parse_rules(
    c: &mut Cursor,
    lhs: &str,
    file: &str,
    rules: &mut Vec<RawRule>,
    errors: &mut Vec<GrammarError>,
) -> bool {
    let mut is_null = false;

    loop {
        let mut symbols: Vec<String> = Vec::new();
        let mut cur_symbol = String::new();
        let mut code = String::new();
        let start_line = c.line;
        let mut has_code_block = false;

        loop {
            let ch = match c.get() {
                None => {
                    errors.push(c.err("Unexpected EOF"));
                    return is_null;
                }
                Some(ch) => ch,
            };
            if ch == '{' {
                if !cur_symbol.is_empty() {
                    symbols.push(std::mem::take(&mut cur_symbol));
                }
                has_code_block = true;
                break;
            }
            if is_name_char(ch) {
                cur_symbol.push(ch);
                continue;
            }
            if ch == ' ' || ch == '\t' || ch == '\n' {
                if !cur_symbol.is_empty() {
                    symbols.push(std::mem::take(&mut cur_symbol));
                }
                continue;
            }
            if ch == '#' {
                c.skip_comment();
                continue;
            }
            if ch == '|' || ch == ';' {
                if !cur_symbol.is_empty() {
                    symbols.push(std::mem::take(&mut cur_symbol));
                }
                c.unget();
                break;
            }
            errors.push(c.err(format!(
                "Invalid char '{ch}' in rule definition, expected symbol or code block"
            )));
            return is_null;
        }

        let mut new_null = false;
        for s in &symbols {
            if s == EMPTY_NAME {
                is_null = true;
                new_null = true;
                if symbols.len() > 1 {
                    errors.push(GrammarError::EmptyWithOtherSymbols { file: file.to_string() });
                }
                break;
            }
        }
        if new_null {
            symbols.clear();
        }

        if has_code_block {
            // skip leading whitespace before the action text
            loop {
                match c.get() {
                    Some(ch) if ch == ' ' || ch == '\t' || ch == '\n' => continue,
                    Some(_) => {
                        c.unget();
                        break;
                    }
                    None => break,
                }
            }
            let mut depth = 1usize;
            loop {
                let ch = match c.get() {
                    None => {
                        errors.push(c.err("Unexpected EOF in action block"));
                        break;
                    }
                    Some(ch) => ch,
                };
                if ch == '{' {
                    depth += 1;
                } else if ch == '}' {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                code.push(ch);
            }
            code = code.trim().to_string();
        } else {
            code = "return $0;".to_string();
        }

        rules.push(RawRule {
            nonterm: lhs.to_string(),
            symbols,
            code,
            line: start_line,
        });

        let mut hit_semi = false;
        loop {
            match c.get() {
                Some(ch) if ch == ' ' || ch == '\t' || ch == '\n' => continue,
                Some('|') => break,
                Some(';') => {
                    hit_semi = true;
                    break;
                }
                Some('#') => c.skip_comment(),
                Some(ch) => {
                    errors.push(c.err(format!("Invalid char '{ch}', expected ';' or '|'")));
                    return is_null;
                }
                None => {
                    errors.push(c.err("Unexpected EOF"));
                    return is_null;
                }
            }
        }
        if hit_semi {
            break;
        }
    }

    is_null
}

fn load_file(path: &Path, builder: &mut Builder) {
    let canon = path.to_path_buf();
    if builder.loaded_files.contains(&canon) {
        return;
    }
    builder.loaded_files.insert(canon.clone());

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            builder.errors.push(GrammarError::Io {
                path: path.display().to_string(),
                source: std::rc::Rc::new(e),
            });
            return;
        }
    };
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_label = path.display().to_string();
    parse_into(&text, &file_label, builder, &dir);
}

/// Parses grammar source text that has no relative `%import`s (tests use
/// this directly; `parse_grammar_file` is the `%import`-aware entry point).
pub fn parse_grammar_str(text: &str, label: &str) -> Result<Grammar> {
    let mut builder = Builder::new();
    parse_into(text, label, &mut builder, Path::new("."));
    finish(builder, label)
}

pub fn parse_grammar_file(path: impl AsRef<Path>) -> Result<Grammar> {
    let path = path.as_ref();
    let mut builder = Builder::new();
    load_file(path, &mut builder);
    finish(builder, &path.display().to_string())
}

fn finish(mut builder: Builder, label: &str) -> Result<Grammar> {
    for rule in &builder.rule_defs {
        for sym in &rule.symbols {
            if !builder.terminal_names.contains(sym) && !builder.nonterminals.contains(sym) {
                builder.errors.push(GrammarError::UndefinedSymbol {
                    file: label.to_string(),
                    symbol: sym.clone(),
                    rule: format!("{} = {}", rule.nonterm, rule.symbols.join(" ")),
                });
            }
        }
        if builder.terminal_names.contains(&rule.nonterm) {
            builder.errors.push(GrammarError::TerminalAsNonterminal {
                file: label.to_string(),
                name: rule.nonterm.clone(),
            });
        }
    }

    if !builder.directives.contains_key(directive::RETURN) {
        builder.errors.push(GrammarError::MissingDirective {
            file: label.to_string(),
            directive: directive::RETURN.to_string(),
        });
    } else if builder.directives[directive::RETURN].len() > 1 {
        builder.errors.push(GrammarError::DuplicateDirective {
            file: label.to_string(),
            directive: directive::RETURN.to_string(),
        });
    }

    if let Some(ignores) = builder.directives.get(directive::IGNORE).cloned() {
        let mut processed = Vec::new();
        for ignore in ignores {
            if ignore.len() <= 2 {
                builder.errors.push(GrammarError::Syntax {
                    file: label.to_string(),
                    line: 0,
                    col: 0,
                    message: "Invalid %ignore, regex cannot be empty".to_string(),
                });
                continue;
            }
            let bytes: Vec<char> = ignore.chars().collect();
            let quote = bytes[0];
            if (quote != '"' && quote != '\'') || bytes[bytes.len() - 1] != quote {
                builder.errors.push(GrammarError::Syntax {
                    file: label.to_string(),
                    line: 0,
                    col: 0,
                    message: "Invalid %ignore, regex must be quoted".to_string(),
                });
                continue;
            }
            let inner: String = bytes[1..bytes.len() - 1].iter().collect();
            processed.push(inner.replace(&format!("\\{quote}"), &quote.to_string()));
        }
        builder.directives.insert(directive::IGNORE.to_string(), processed);
    }

    if !builder.errors.is_empty() {
        let n = builder.errors.len();
        let first = builder.errors.remove(0);
        // surface the first accumulated error; callers that want the full
        // list can match on GrammarError::Fatal's count and re-run with
        // diagnostics enabled (kept deliberately simple for the core).
        let _ = n;
        return Err(first.into());
    }

    if builder.rule_defs.is_empty() {
        return Err(GrammarError::Syntax {
            file: label.to_string(),
            line: 0,
            col: 0,
            message: "grammar has no rules".to_string(),
        }
        .into());
    }

    let mut symbols = SymbolTable::new();
    for (name, pattern) in &builder.terminals {
        symbols.intern(name, Some(pattern.clone()));
    }
    let terminal_order: Vec<SymbolId> = builder
        .terminals
        .iter()
        .map(|(name, _)| symbols.get(name).unwrap())
        .collect();

    let mut rules: RuleVec<Rule> = RuleVec::new();
    for (idx, raw) in builder.rule_defs.iter().enumerate() {
        let lhs = symbols.intern(&raw.nonterm, None);
        let rhs = raw
            .symbols
            .iter()
            .map(|s| symbols.intern(s, None))
            .collect::<Vec<_>>();
        rules.push(Rule {
            id: RuleId(idx),
            lhs,
            rhs,
            action: substitute_actions(&raw.code, &raw.symbols, &raw.nonterm, &builder.terminal_names, label)?,
            line: raw.line,
            file: label.to_string(),
        });
    }

    for (name, _) in &builder.terminals {
        let _ = name;
    }
    for name in &builder.nulls {
        if let Some(id) = symbols.get(name) {
            symbols.nullable[id] = true;
        }
    }

    let natural_start = rules[RuleId(0)].lhs;
    let start_rule_count = rules.iter().filter(|r| r.lhs == natural_start).count();

    let start = if start_rule_count == 1 {
        natural_start
    } else {
        // Spec.md §3: "if the user writes multiple productions for the
        // natural start symbol, a synthetic single-RHS start production is
        // prepended."
        let synthetic = symbols.intern(crate::symbol::START_NAME, None);
        let synthetic_id = RuleId(rules.len());
        let mut new_rules: RuleVec<Rule> = RuleVec::new();
        new_rules.push(Rule {
            id: synthetic_id,
            lhs: synthetic,
            rhs: vec![natural_start],
            action: "return $0;".to_string(),
            line: 0,
            file: label.to_string(),
        });
        for r in rules.into_iter() {
            new_rules.push(r);
        }
        // renumber ids in file order, synthetic start first as rule 0
        let mut renumbered: RuleVec<Rule> = RuleVec::new();
        for (idx, mut r) in new_rules.into_iter().enumerate() {
            r.id = RuleId(idx);
            renumbered.push(r);
        }
        rules = renumbered;
        synthetic
    };

    Ok(Grammar {
        rules,
        symbols,
        directives: builder.directives,
        start,
        terminal_order,
    })
}

/// Action-code substitution: rewrites `$N`/`$name` to a stack-slot
/// accessor string and leaves
/// `@N`/`@name` as a location-accessor string. No code is compiled or
/// executed; this only produces the rewritten action text stored on
/// [`Rule::action`].
fn substitute_actions(
    code: &str,
    rhs_names: &[String],
    lhs_name: &str,
    terminal_names: &HashSet<String>,
    file: &str,
) -> Result<String> {
    use regex::Regex;
    use once_cell::sync::Lazy;

    static ARG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?P<cmd>\$|@)((?P<idx>\d+)|(?P<name>[A-Za-z_]\w*))").unwrap());

    let mut out = String::new();
    let mut last = 0;
    for caps in ARG_RE.captures_iter(code) {
        let m = caps.get(0).unwrap();
        out.push_str(&code[last..m.start()]);
        last = m.end();

        let cmd = &caps["cmd"];
        let idx = if let Some(name) = caps.name("name") {
            let name = name.as_str();
            let count = rhs_names.iter().filter(|s| s.as_str() == name).count();
            if count > 1 {
                return Err(GrammarError::Substitution {
                    file: file.to_string(),
                    message: format!(
                        "cannot substitute symbol '${name}', symbol repeated in rule {lhs_name}, use an index instead"
                    ),
                }
                .into());
            } else if count == 0 {
                return Err(GrammarError::Substitution {
                    file: file.to_string(),
                    message: format!("cannot substitute symbol '${name}', symbol not in rule {lhs_name}"),
                }
                .into());
            }
            rhs_names.iter().position(|s| s == name).unwrap()
        } else {
            let idx: usize = caps["idx"].parse().unwrap();
            if idx >= rhs_names.len() {
                return Err(GrammarError::Substitution {
                    file: file.to_string(),
                    message: format!("code substitution index {idx} out of bounds in rule {lhs_name}"),
                }
                .into());
            }
            idx
        };

        // Indices are zero-based from the left in source, but the parser's
        // runtime stack is reversed, so the accessor index is inverted.
        let stack_idx = rhs_names.len() - idx - 1;
        let sym_name = &rhs_names[idx];
        let accessor = if cmd == "$" {
            if terminal_names.contains(sym_name) {
                format!("args[{stack_idx}].t()")
            } else {
                format!("args[{stack_idx}].nt()")
            }
        } else {
            format!("args[{stack_idx}].loc()")
        };
        out.push_str(&accessor);
    }
    out.push_str(&code[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rules_terminals_and_return_directive() {
        let src = r#"
%return S
S = A B ;
A = "a" ;
B = "b" ;
"#;
        let g = parse_grammar_str(src, "test").unwrap();
        assert_eq!(g.directives[directive::RETURN], vec!["S".to_string()]);
        let s = g.symbols.get("S").unwrap();
        assert_eq!(g.start, s);
        assert_eq!(g.rules.len(), 1);
        assert_eq!(g.rule(RuleId(0)).rhs.len(), 2);
    }

    #[test]
    fn missing_return_directive_is_an_error() {
        let src = r#"
S = "a" ;
"#;
        let err = parse_grammar_str(src, "test").unwrap_err();
        assert!(err.to_string().contains("return"));
    }

    #[test]
    fn undefined_symbol_is_an_error() {
        let src = r#"
%return S
S = Missing ;
"#;
        let err = parse_grammar_str(src, "test").unwrap_err();
        assert!(err.to_string().contains("undefined symbol"));
    }

    #[test]
    fn duplicate_terminal_definition_is_an_error() {
        let src = r#"
%return S
S = a ;
a = "x" ;
a = "y" ;
"#;
        let err = parse_grammar_str(src, "test").unwrap_err();
        assert!(err.to_string().contains("duplicate terminal"));
    }

    #[test]
    fn reserved_lhs_name_is_rejected() {
        let src = r#"
%return S
EMPTY = "x" ;
"#;
        assert!(parse_grammar_str(src, "test").is_err());
    }

    #[test]
    fn empty_production_marks_nonterminal_nullable() {
        let src = r#"
%return S
S = A "x" ;
A = EMPTY ;
"#;
        let g = parse_grammar_str(src, "test").unwrap();
        let a = g.symbols.get("A").unwrap();
        assert!(g.symbols.nullable[a]);
        let a_rule = g.rules.iter().find(|r| r.lhs == a).unwrap();
        assert!(a_rule.is_empty());
    }

    #[test]
    fn multiple_start_productions_get_a_synthetic_wrapper() {
        let src = r#"
%return S
S = A ;
S = B ;
A = "a" ;
B = "b" ;
"#;
        let g = parse_grammar_str(src, "test").unwrap();
        assert_eq!(g.symbols.name(g.start), crate::symbol::START_NAME);
        let synthetic_rule = g.rule(RuleId(0));
        assert_eq!(synthetic_rule.lhs, g.start);
        assert_eq!(synthetic_rule.rhs.len(), 1);
    }

    #[test]
    fn action_substitution_rewrites_positional_and_named_refs() {
        let src = r#"
%return S
S = A B { return $0 + $B; } ;
A = "a" ;
B = "b" ;
"#;
        let g = parse_grammar_str(src, "test").unwrap();
        let rule = g.rule(RuleId(0));
        assert!(rule.action.contains("args["));
        assert!(!rule.action.contains('$'));
    }

    #[test]
    fn action_substitution_rejects_unknown_name() {
        let src = r#"
%return S
S = A { return $nope; } ;
A = "a" ;
"#;
        assert!(parse_grammar_str(src, "test").is_err());
    }

    #[test]
    fn default_action_returns_first_stack_item() {
        let src = r#"
%return S
S = A ;
A = "a" ;
"#;
        let g = parse_grammar_str(src, "test").unwrap();
        // `finish()` runs every rule's action text (including the
        // synthesized default) through `substitute_actions`, so `$0`
        // comes out rewritten to the RHS's stack accessor: `A` is a
        // nonterminal, so `args[0].nt()` rather than a terminal lexeme.
        assert_eq!(g.rule(RuleId(0)).action, "return args[0].nt();");
    }

    #[test]
    fn line_comments_and_block_comments_are_skipped() {
        let src = r#"
# a line comment
%return S
## a block
comment ##
S = "a" ; # trailing comment
"#;
        assert!(parse_grammar_str(src, "test").is_ok());
    }
}
