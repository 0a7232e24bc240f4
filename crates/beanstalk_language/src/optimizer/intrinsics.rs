//! Compiler intrinsics: calls answered while optimizing instead of at run
//! time.
//!
//! The optimizer dispatches each recognized call to a [`CompilerFunctions`]
//! implementation. Returning `Ok(None)` keeps the call as written; a call on a
//! compiler function that survives optimization is rejected by the compiler.

use beanstalk_foundation::{Error, Result};

use crate::ast::{CompareOp, Node};
use crate::optimizer::connections::Connections;
use crate::optimizer::fold::fold_compare;
use crate::settings::SettingReader;
use crate::symbols::{SymbolKind, SymbolTable};
use crate::visitor::{rewrite, rewrite_all, Rewriter};

/// Intrinsics that only exist at compile time.
pub const COMPILER_FUNCTIONS: [&str; 6] = [
    "at",
    "compare_setting",
    "had_night_start",
    "here",
    "is_trick_enabled",
    "is_trial_skipped",
];

/// Intrinsics that fall back to a run-time built-in when they cannot be
/// answered early.
pub const FOLDABLE_BUILTINS: [&str; 3] = ["load_setting", "load_setting_2", "region_has_shortcuts"];

/// `starting_tod` values that begin the game at night.
const NIGHT_STARTS: [&str; 4] = ["sunset", "evening", "midnight", "witching-hour"];

/// Compile-time expansion hooks. Every method defaults to leaving the call
/// alone.
#[allow(unused_variables)]
pub trait CompilerFunctions {
    /// `at(region, rule)`
    fn at(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `here(rule)`
    fn here(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `compare_setting(op, lhs, rhs)`
    fn compare_setting(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `had_night_start()`
    fn had_night_start(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `is_trick_enabled("trick")`
    fn is_trick_enabled(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `is_trial_skipped("Trial")`
    fn is_trial_skipped(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `load_setting(setting)`
    fn load_setting(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `load_setting_2(setting, key)`
    fn load_setting_2(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        Ok(None)
    }

    /// `region_has_shortcuts("Region")`
    fn region_has_shortcuts(
        &mut self,
        symbols: &mut SymbolTable,
        args: &[Node],
    ) -> Result<Option<Node>> {
        Ok(None)
    }
}

/// The rewrite pass that dispatches calls to a [`CompilerFunctions`].
///
/// Arguments are expanded before the call itself, except for `at` and
/// `here`, whose rule is compiled later on its own edge.
pub struct ExpandIntrinsics<'a, F: CompilerFunctions + ?Sized> {
    funcs: &'a mut F,
    symbols: &'a mut SymbolTable,
}

impl<'a, F: CompilerFunctions + ?Sized> ExpandIntrinsics<'a, F> {
    /// Creates the pass.
    pub fn new(funcs: &'a mut F, symbols: &'a mut SymbolTable) -> Self {
        Self { funcs, symbols }
    }
}

impl<F: CompilerFunctions + ?Sized> Rewriter for ExpandIntrinsics<'_, F> {
    fn rewrite_invoke(&mut self, target: Node, args: Vec<Node>) -> Result<Node> {
        let name = target
            .as_identifier()
            .map(|id| self.symbols.name_of(id).to_string())
            .unwrap_or_default();

        let args = match name.as_str() {
            "at" | "here" => args,
            _ => rewrite_all(self, args)?,
        };

        let symbols = &mut *self.symbols;
        let expanded = match name.as_str() {
            "at" => self.funcs.at(symbols, &args)?,
            "here" => self.funcs.here(symbols, &args)?,
            "compare_setting" => self.funcs.compare_setting(symbols, &args)?,
            "had_night_start" => self.funcs.had_night_start(symbols, &args)?,
            "is_trick_enabled" => self.funcs.is_trick_enabled(symbols, &args)?,
            "is_trial_skipped" => self.funcs.is_trial_skipped(symbols, &args)?,
            "load_setting" => self.funcs.load_setting(symbols, &args)?,
            "load_setting_2" => self.funcs.load_setting_2(symbols, &args)?,
            "region_has_shortcuts" => self.funcs.region_has_shortcuts(symbols, &args)?,
            _ => None,
        };

        match expanded {
            Some(node) => Ok(node),
            None => Ok(Node::Invoke {
                target: Box::new(rewrite(self, target)?),
                args,
            }),
        }
    }
}

fn expect_args<'n, const N: usize>(name: &str, args: &'n [Node]) -> Result<&'n [Node; N]> {
    args.try_into()
        .map_err(|_| Error::arity_mismatch(N.to_string(), args.len()).in_frame(name.to_string()))
}

fn expect_str<'n>(name: &str, node: &'n Node) -> Result<&'n str> {
    match node {
        Node::Str(s) => Ok(s),
        other => Err(Error::optimization(format!(
            "{name} expects a string, got {}",
            other.kind_name()
        ))),
    }
}

/// Name carried by an identifier or string argument.
fn name_of<'n>(symbols: &'n SymbolTable, node: &'n Node) -> Option<&'n str> {
    match node {
        Node::Identifier(id) => Some(symbols.name_of(*id)),
        Node::Str(s) => Some(s),
        _ => None,
    }
}

/// Intrinsics answered from a [`SettingReader`], plus `at` and `here` when a
/// [`Connections`] queue is attached.
pub struct SettingsFunctions<'a> {
    reader: &'a dyn SettingReader,
    connections: Option<(&'a mut Connections, &'a str)>,
}

impl<'a> SettingsFunctions<'a> {
    /// Settings-only intrinsics; `at` and `here` stay unexpanded.
    #[must_use]
    pub fn new(reader: &'a dyn SettingReader) -> Self {
        Self {
            reader,
            connections: None,
        }
    }

    /// Expands `at` and `here` into `connections`, with `current` as the
    /// location whose rule is being compiled.
    #[must_use]
    pub fn with_connections(mut self, connections: &'a mut Connections, current: &'a str) -> Self {
        self.connections = Some((connections, current));
        self
    }

    /// A setting operand becomes its known value or a run-time load; a bare
    /// enumerator becomes its spelling.
    fn comparand(&self, symbols: &mut SymbolTable, node: &Node) -> Result<Node> {
        let Node::Identifier(id) = node else {
            return Ok(node.clone());
        };
        let name = symbols.name_of(*id).to_string();
        if symbols.kind_of(*id) != SymbolKind::Setting {
            return Ok(Node::Str(name));
        }
        if let Some(value) = self.reader.setting(&name) {
            return Ok(value.to_node());
        }
        let load = symbols.declare("load_setting", SymbolKind::BuiltIn)?;
        Ok(Node::invoke(load, vec![node.clone()]))
    }
}

impl CompilerFunctions for SettingsFunctions<'_> {
    fn at(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [region, rule] = expect_args::<2>("at", args)?;
        let region = expect_str("at", region)?;
        let Some((connections, current)) = self.connections.as_mut() else {
            return Ok(None);
        };
        connections
            .generate(symbols, region, *current, rule.clone())
            .map(Some)
    }

    fn here(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [rule] = expect_args::<1>("here", args)?;
        let Some((connections, current)) = self.connections.as_mut() else {
            return Ok(None);
        };
        connections
            .generate(symbols, *current, *current, rule.clone())
            .map(Some)
    }

    fn compare_setting(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [code, lhs, rhs] = expect_args::<3>("compare_setting", args)?;
        let op = match code {
            Node::Number(n) => CompareOp::from_code(*n),
            _ => None,
        }
        .ok_or_else(|| Error::optimization("compare_setting needs an operator code"))?;

        let lhs = self.comparand(symbols, lhs)?;
        let rhs = self.comparand(symbols, rhs)?;
        Ok(Some(match fold_compare(op, &lhs, &rhs) {
            Some(b) => Node::Bool(b),
            None => Node::compare(op, lhs, rhs),
        }))
    }

    fn had_night_start(&mut self, _: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        expect_args::<0>("had_night_start", args)?;
        let night = self
            .reader
            .string("starting_tod")
            .is_some_and(|tod| NIGHT_STARTS.contains(&tod.as_str()));
        Ok(Some(Node::Bool(night)))
    }

    fn is_trick_enabled(&mut self, _: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [trick] = expect_args::<1>("is_trick_enabled", args)?;
        let trick = expect_str("is_trick_enabled", trick)?;
        Ok(Some(Node::Bool(self.reader.trick_enabled(trick))))
    }

    fn is_trial_skipped(&mut self, _: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [trial] = expect_args::<1>("is_trial_skipped", args)?;
        let trial = expect_str("is_trial_skipped", trial)?;
        let skipped = self
            .reader
            .indexed("skipped_trials", trial)
            .map_or(Node::Bool(true), |value| value.to_node());
        Ok(Some(skipped))
    }

    fn load_setting(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [setting] = expect_args::<1>("load_setting", args)?;
        Ok(name_of(symbols, setting)
            .and_then(|name| self.reader.setting(name))
            .map(|value| value.to_node()))
    }

    fn load_setting_2(&mut self, symbols: &mut SymbolTable, args: &[Node]) -> Result<Option<Node>> {
        let [setting, key] = expect_args::<2>("load_setting_2", args)?;
        let (Some(name), Some(key_name)) = (name_of(symbols, setting), name_of(symbols, key)) else {
            return Ok(None);
        };
        if let Some(value) = self.reader.indexed(name, key_name) {
            return Ok(Some(value.to_node()));
        }
        // the VM receives the key as a string
        if let Node::Identifier(_) = key {
            let key = Node::Str(key_name.to_string());
            let load = symbols.declare("load_setting_2", SymbolKind::BuiltIn)?;
            return Ok(Some(Node::invoke(load, vec![setting.clone(), key])));
        }
        Ok(None)
    }

    fn region_has_shortcuts(
        &mut self,
        _: &mut SymbolTable,
        args: &[Node],
    ) -> Result<Option<Node>> {
        let [region] = expect_args::<1>("region_has_shortcuts", args)?;
        let region = expect_str("region_has_shortcuts", region)?;
        Ok(self
            .reader
            .indexed("dungeon_shortcuts", region)
            .map(|value| value.to_node()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StaticSettings;

    struct Fixture {
        symbols: SymbolTable,
    }

    impl Fixture {
        fn new() -> Self {
            let mut symbols = SymbolTable::new();
            symbols
                .declare_many(SymbolKind::CompFunc, COMPILER_FUNCTIONS)
                .unwrap();
            symbols
                .declare_many(SymbolKind::BuiltIn, FOLDABLE_BUILTINS)
                .unwrap();
            Self { symbols }
        }

        fn call(&mut self, name: &str, args: Vec<Node>) -> Node {
            Node::invoke(self.symbols.lookup(name).unwrap().id, args)
        }

        fn expand(&mut self, funcs: &mut SettingsFunctions<'_>, node: Node) -> Result<Node> {
            rewrite(&mut ExpandIntrinsics::new(funcs, &mut self.symbols), node)
        }
    }

    #[test]
    fn tricks_and_trials() {
        let settings = StaticSettings::new()
            .with_trick("grottos_without_agony")
            .with_indexed("skipped_trials", "Forest", false);
        let mut funcs = SettingsFunctions::new(&settings);
        let mut f = Fixture::new();

        let on = f.call("is_trick_enabled", vec![Node::Str("grottos_without_agony".into())]);
        let off = f.call("is_trick_enabled", vec![Node::Str("lens_bow".into())]);
        assert_eq!(f.expand(&mut funcs, on).unwrap(), Node::Bool(true));
        assert_eq!(f.expand(&mut funcs, off).unwrap(), Node::Bool(false));

        let forest = f.call("is_trial_skipped", vec![Node::Str("Forest".into())]);
        let fire = f.call("is_trial_skipped", vec![Node::Str("Fire".into())]);
        assert_eq!(f.expand(&mut funcs, forest).unwrap(), Node::Bool(false));
        assert_eq!(f.expand(&mut funcs, fire).unwrap(), Node::Bool(true));
    }

    #[test]
    fn known_settings_fold() {
        let settings = StaticSettings::new().with("bridge", "medallions");
        let mut funcs = SettingsFunctions::new(&settings);
        let mut f = Fixture::new();
        let bridge = f.symbols.declare("bridge", SymbolKind::Setting).unwrap();
        let value = f.symbols.declare("medallions", SymbolKind::Unknown).unwrap();

        let cmp = f.call(
            "compare_setting",
            vec![
                Node::Number(CompareOp::Eq.code()),
                Node::Identifier(bridge),
                Node::Identifier(value),
            ],
        );
        assert_eq!(f.expand(&mut funcs, cmp).unwrap(), Node::Bool(true));

        let load = f.call("load_setting", vec![Node::Identifier(bridge)]);
        assert_eq!(
            f.expand(&mut funcs, load).unwrap(),
            Node::Str("medallions".into())
        );
    }

    #[test]
    fn unknown_settings_load_at_run_time() {
        let settings = StaticSettings::new();
        let mut funcs = SettingsFunctions::new(&settings);
        let mut f = Fixture::new();
        let count = f.symbols.declare("bridge_medallions", SymbolKind::Setting).unwrap();

        let cmp = f.call(
            "compare_setting",
            vec![
                Node::Number(CompareOp::Lt.code()),
                Node::Number(2.0),
                Node::Identifier(count),
            ],
        );
        let load = f.call("load_setting", vec![Node::Identifier(count)]);
        assert_eq!(
            f.expand(&mut funcs, cmp).unwrap(),
            Node::compare(CompareOp::Lt, Node::Number(2.0), load.clone())
        );
        assert_eq!(f.expand(&mut funcs, load.clone()).unwrap(), load);
    }

    #[test]
    fn night_start() {
        let settings = StaticSettings::new().with("starting_tod", "midnight");
        let mut funcs = SettingsFunctions::new(&settings);
        let mut f = Fixture::new();
        let call = f.call("had_night_start", vec![]);
        assert_eq!(f.expand(&mut funcs, call).unwrap(), Node::Bool(true));

        let settings = StaticSettings::new().with("starting_tod", "default");
        let mut funcs = SettingsFunctions::new(&settings);
        let call = f.call("had_night_start", vec![]);
        assert_eq!(f.expand(&mut funcs, call).unwrap(), Node::Bool(false));
    }

    #[test]
    fn connections_need_a_queue() {
        let settings = StaticSettings::new();
        let mut f = Fixture::new();
        let at = f.call(
            "at",
            vec![Node::Str("Some Other Region".into()), Node::Str("Sticks".into())],
        );

        let mut funcs = SettingsFunctions::new(&settings);
        assert_eq!(f.expand(&mut funcs, at.clone()).unwrap(), at);

        let mut connections = Connections::new();
        let mut funcs = SettingsFunctions::new(&settings).with_connections(&mut connections, "L");
        let out = f.expand(&mut funcs, at).unwrap();
        let batch = connections.swap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].origin_name, "Some Other Region");
        assert_eq!(batch[0].attached_to, "L");
        assert_eq!(batch[0].rule, Node::Str("Sticks".into()));
        assert_eq!(out.invoked(), f.symbols.lookup("has").map(|s| s.id));
    }

    #[test]
    fn wrong_argument_counts_are_errors() {
        let settings = StaticSettings::new();
        let mut funcs = SettingsFunctions::new(&settings);
        let mut f = Fixture::new();
        let call = f.call("is_trick_enabled", vec![]);
        assert!(f.expand(&mut funcs, call).is_err());
    }
}
