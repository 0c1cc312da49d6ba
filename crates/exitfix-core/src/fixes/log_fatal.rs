//! `if err != nil { log.Fatal(err) }` becomes `exit.On(err)`.

use exitfix_golang::ast::{Ast, Node, NodeId, ObjKind};
use exitfix_golang::{apply, astutil, Field, GoError};
use tracing::debug;

use crate::config::LogFatalConfig;
use crate::error::RegistryError;
use crate::rule::{Fix, Rule};

pub const NAME: &str = "log.Fatal";
pub const DATE: &str = "2017-09-10";
pub const DESCRIPTION: &str = "Replaces error checks that call log.Fatal with exit.On";

#[derive(Debug, Clone)]
pub struct LogFatal {
    config: LogFatalConfig,
}

/// Parts of a matched `if` statement that survive the rewrite.
struct Match {
    init: Option<NodeId>,
    arg: NodeId,
}

impl LogFatal {
    pub fn new(config: LogFatalConfig) -> Self {
        Self { config }
    }

    pub fn rule(config: &LogFatalConfig) -> Result<Rule, RegistryError> {
        Rule::new(NAME, DATE, DESCRIPTION, Self::new(config.clone()))
    }

    /// Name the logging package goes by in this file, if it is imported
    /// under a name that selectors can use.
    fn logging_name(&self, ast: &Ast) -> Option<String> {
        let import = astutil::find_import(ast, &self.config.logging_import)?;
        let name = astutil::import_local_name(ast, import.spec)?;
        (name != "_" && name != ".").then_some(name)
    }

    fn match_if(&self, ast: &Ast, id: NodeId, log_name: &str) -> Option<Match> {
        let Node::If(stmt) = ast.node(id) else {
            return None;
        };
        if stmt.else_branch.is_some() {
            return None;
        }

        let Node::Binary(cond) = ast.node(stmt.cond) else {
            return None;
        };
        if cond.op != "!=" {
            return None;
        }
        let Node::Ident(var) = ast.node(cond.x) else {
            return None;
        };
        if var.obj != Some(ObjKind::Var) {
            return None;
        }
        match ast.node(cond.y) {
            Node::Ident(nil) if nil.name == "nil" && nil.obj.is_none() => {}
            _ => return None,
        }

        let [only] = ast.children(stmt.body, Field::List) else {
            return None;
        };
        if ast.data(*only).trailing.is_some() {
            return None;
        }
        let Node::ExprStmt(expr) = ast.node(*only) else {
            return None;
        };
        let Node::Call(call) = ast.node(expr.x) else {
            return None;
        };
        if call.ellipsis || call.args.len() != 1 {
            return None;
        }
        let Node::Selector(selector) = ast.node(call.fun) else {
            return None;
        };
        let Node::Ident(package) = ast.node(selector.x) else {
            return None;
        };
        if package.name != log_name || package.obj.is_some_and(|obj| obj != ObjKind::Package) {
            return None;
        }
        if ast.ident_name(selector.sel) != Some(self.config.fatal_function.as_str()) {
            return None;
        }

        let arg = call.args[0];
        if ast.ident_name(arg) != Some(var.name.as_str()) {
            return None;
        }
        Some(Match {
            init: stmt.init,
            arg,
        })
    }
}

impl Fix for LogFatal {
    fn apply(&self, ast: &mut Ast) -> Result<bool, GoError> {
        if !astutil::uses_import(ast, &self.config.logging_import) {
            return Ok(false);
        }
        let Some(log_name) = self.logging_name(ast) else {
            return Ok(false);
        };

        let mut fixed = false;
        apply(ast, |cursor| {
            let node = cursor.node();
            if !cursor.in_list() {
                return Ok(true);
            }
            let Some(found) = self.match_if(cursor.ast(), node, &log_name) else {
                return Ok(true);
            };

            let ast = cursor.ast_mut();
            let blank_before = ast.data(node).blank_before;
            let package = ast.ident(&self.config.assertion_package);
            let fun = ast.selector(package, &self.config.assertion_function);
            let call = ast.call(fun, vec![found.arg]);
            let replacement = ast.expr_stmt(call);
            match found.init {
                Some(init) => {
                    cursor.insert_before(init)?;
                    cursor.replace(replacement)?;
                    let ast = cursor.ast_mut();
                    ast.data_mut(init).blank_before = blank_before;
                    ast.data_mut(replacement).blank_before = false;
                }
                None => {
                    cursor.replace(replacement)?;
                }
            }
            debug!(call = %self.config.assertion_call(), "replaced fatal error check");
            fixed = true;
            Ok(false)
        })?;
        if !fixed {
            return Ok(false);
        }

        astutil::add_import(ast, &self.config.assertion_import)?;
        if !astutil::uses_import(ast, &self.config.logging_import) {
            astutil::delete_import(ast, &self.config.logging_import)?;
        }
        Ok(true)
    }

    fn introduced_calls(&self) -> Vec<String> {
        vec![self.config.assertion_call()]
    }
}

#[cfg(test)]
mod tests {
    use exitfix_golang::{GoParser, GoPrinter};
    use pretty_assertions::assert_eq;

    use super::*;

    fn rewrite(source: &str) -> (bool, String) {
        let mut ast = GoParser::new().unwrap().parse(source).unwrap();
        let fired = LogFatal::new(LogFatalConfig::default())
            .apply(&mut ast)
            .unwrap();
        (fired, GoPrinter::new().print(&ast).unwrap())
    }

    #[test]
    fn rewrites_a_plain_error_check() {
        let (fired, text) = rewrite(
            "package main\n\nimport \"log\"\n\nfunc f() {\n\terr := g()\n\tif err != nil {\n\t\tlog.Fatal(err)\n\t}\n}\n",
        );
        assert!(fired);
        assert_eq!(
            text,
            "package main\n\nimport \"github.com/Originate/exit\"\n\nfunc f() {\n\terr := g()\n\texit.On(err)\n}\n"
        );
    }

    #[test]
    fn keeps_the_initializer_in_front() {
        let (fired, text) = rewrite(
            "package main\n\nimport \"log\"\n\nfunc f() {\n\tif err := g(); err != nil {\n\t\tlog.Fatal(err)\n\t}\n}\n",
        );
        assert!(fired);
        assert_eq!(
            text,
            "package main\n\nimport \"github.com/Originate/exit\"\n\nfunc f() {\n\terr := g()\n\texit.On(err)\n}\n"
        );
    }

    #[test]
    fn leaves_other_shapes_alone() {
        for source in [
            // else branch
            "package main\n\nimport \"log\"\n\nfunc f(err error) {\n\tif err != nil {\n\t\tlog.Fatal(err)\n\t} else {\n\t\tg()\n\t}\n}\n",
            // more than one statement
            "package main\n\nimport \"log\"\n\nfunc f(err error) {\n\tif err != nil {\n\t\tg()\n\t\tlog.Fatal(err)\n\t}\n}\n",
            // different argument
            "package main\n\nimport \"log\"\n\nfunc f(err, other error) {\n\tif err != nil {\n\t\tlog.Fatal(other)\n\t}\n}\n",
            // == instead of !=
            "package main\n\nimport \"log\"\n\nfunc f(err error) {\n\tif err == nil {\n\t\tlog.Fatal(err)\n\t}\n}\n",
            // shadowed logging package
            "package main\n\nimport \"log\"\n\nfunc f(err error) {\n\tlog := g()\n\tif err != nil {\n\t\tlog.Fatal(err)\n\t}\n}\n",
        ] {
            let (fired, text) = rewrite(source);
            assert!(!fired, "unexpected rewrite of:\n{source}");
            assert_eq!(text, source);
        }
    }

    #[test]
    fn files_without_the_logging_import_are_skipped() {
        let source = "package main\n\nfunc f(err error) {\n\tif err != nil {\n\t\tlog.Fatal(err)\n\t}\n}\n";
        let (fired, text) = rewrite(source);
        assert!(!fired);
        assert_eq!(text, source);
    }

    #[test]
    fn keeps_the_logging_import_while_still_used() {
        let (fired, text) = rewrite(
            "package main\n\nimport \"log\"\n\nfunc f(err error) {\n\tif err != nil {\n\t\tlog.Fatal(err)\n\t}\n\tlog.Println(\"done\")\n}\n",
        );
        assert!(fired);
        assert_eq!(
            text,
            "package main\n\nimport (\n\t\"log\"\n\n\t\"github.com/Originate/exit\"\n)\n\nfunc f(err error) {\n\texit.On(err)\n\tlog.Println(\"done\")\n}\n"
        );
    }

    #[test]
    fn follows_an_aliased_logging_import() {
        let (fired, text) = rewrite(
            "package main\n\nimport l \"log\"\n\nfunc f(err error) {\n\tif err != nil {\n\t\tl.Fatal(err)\n\t}\n}\n",
        );
        assert!(fired);
        assert_eq!(
            text,
            "package main\n\nimport \"github.com/Originate/exit\"\n\nfunc f(err error) {\n\texit.On(err)\n}\n"
        );
    }

    #[test]
    fn rewrites_checks_inside_function_literals() {
        let (fired, text) = rewrite(
            r#"package main

import "log"

func main() {
	go func(err error) {
		if err != nil {
			log.Fatal(err)
		}
	}(run())
}
"#,
        );
        assert!(fired);
        assert_eq!(
            text,
            r#"package main

import "github.com/Originate/exit"

func main() {
	go func(err error) {
		exit.On(err)
	}(run())
}
"#
        );
    }

    #[test]
    fn rewrites_checks_in_type_switch_and_select_clauses() {
        let (fired, text) = rewrite(
            r#"package main

import "log"

func main() {
	switch v := value().(type) {
	case error:
		if v != nil {
			log.Fatal(v)
		}
	}
	select {
	case err := <-errs:
		if err != nil {
			log.Fatal(err)
		}
	}
}
"#,
        );
        assert!(fired);
        assert_eq!(
            text,
            r#"package main

import "github.com/Originate/exit"

func main() {
	switch v := value().(type) {
	case error:
		exit.On(v)
	}
	select {
	case err := <-errs:
		exit.On(err)
	}
}
"#
        );
    }
}
