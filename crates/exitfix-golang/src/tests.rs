use pretty_assertions::assert_eq;

use crate::ast::{Ast, Node, NodeId, ObjKind};
use crate::{apply, astutil, Field, GoParser, GoPrinter};

fn parse(source: &str) -> Ast {
    let mut parser = GoParser::new().expect("grammar should load");
    parser.parse(source).expect("parse should succeed")
}

fn print(ast: &Ast) -> String {
    GoPrinter::new().print(ast).expect("print should succeed")
}

fn find(ast: &Ast, pred: impl Fn(&Node) -> bool) -> NodeId {
    ast.descendants(ast.root())
        .find(|&id| pred(ast.node(id)))
        .expect("node should exist")
}

/// Renames every identifier `from` to `to` through the cursor.
fn rename(ast: &mut Ast, from: &str, to: &str) {
    apply(ast, |cursor| {
        if cursor.ast().ident_name(cursor.node()) == Some(from) {
            let renamed = cursor.ast_mut().ident(to);
            cursor.replace(renamed)?;
        }
        Ok(true)
    })
    .unwrap();
}

/// Binding of the identifier on the left of every `x != nil` check.
fn checked_objs(ast: &Ast) -> Vec<Option<ObjKind>> {
    ast.descendants(ast.root())
        .filter_map(|id| match ast.node(id) {
            Node::If(stmt) => match ast.node(stmt.cond) {
                Node::Binary(cond) => match ast.node(cond.x) {
                    Node::Ident(ident) => Some(ident.obj),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn call_named(ast: &Ast, id: NodeId, name: &str) -> bool {
    match ast.node(id) {
        Node::ExprStmt(stmt) => match ast.node(stmt.x) {
            Node::Call(call) => ast.ident_name(call.fun) == Some(name),
            _ => false,
        },
        _ => false,
    }
}

#[test]
fn parse_reports_syntax_errors() {
    let mut parser = GoParser::new().expect("grammar should load");
    let err = parser
        .parse("package main\n\nfunc f() {\n\tif {\n}\n")
        .expect_err("source should not parse");
    assert!(err.line >= 1);
    assert!(!err.message.is_empty());
}

#[test]
fn untouched_tree_prints_source_verbatim() {
    let source = r#"package main

import (
	"fmt"  // aligned
	"log"
)

type pair struct {
	a, b int
}

func main() {
	for i := 0; i < 3; i++ {
		fmt.Println(i)
	}
	log.Println(pair{1, 2})
}
"#;
    let ast = parse(source);
    assert_eq!(print(&ast), source);
}

#[test]
fn if_statement_is_lowered_and_resolved() {
    let ast = parse(
        r#"package main

func f(err error) {
	if err != nil {
		log.Fatal(err)
	}
}
"#,
    );
    let if_id = find(&ast, |node| matches!(node, Node::If(_)));
    let Node::If(stmt) = ast.node(if_id) else {
        unreachable!()
    };
    assert!(stmt.init.is_none());
    assert!(stmt.else_branch.is_none());

    let Node::Binary(cond) = ast.node(stmt.cond) else {
        panic!("expected a binary condition");
    };
    assert_eq!(cond.op, "!=");
    assert_eq!(
        ast.node(cond.x),
        &Node::Ident(crate::ast::Ident {
            name: "err".to_string(),
            obj: Some(ObjKind::Var),
        })
    );
    assert_eq!(ast.ident_name(cond.y), Some("nil"));

    let body = ast.children(stmt.body, Field::List);
    assert_eq!(body.len(), 1);
    let Node::ExprStmt(expr) = ast.node(body[0]) else {
        panic!("expected an expression statement");
    };
    let Node::Call(call) = ast.node(expr.x) else {
        panic!("expected a call");
    };
    assert_eq!(call.args.len(), 1);
    assert!(matches!(ast.node(call.fun), Node::Selector(_)));
}

#[test]
fn resolver_sees_shadowed_imports() {
    let ast = parse(
        r#"package main

import "log"

func shadowed() {
	log := newLogger()
	log.Fatal("x")
}

func imported() {
	log.Fatal("y")
}
"#,
    );
    let selector_objs: Vec<_> = ast
        .descendants(ast.root())
        .filter_map(|id| match ast.node(id) {
            Node::Selector(selector) => match ast.node(selector.x) {
                Node::Ident(ident) => Some(ident.obj),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(
        selector_objs,
        vec![Some(ObjKind::Var), Some(ObjKind::Package)]
    );
}

#[test]
fn comments_attach_to_statement_lists() {
    let ast = parse(
        r#"package main

func f() {
	foo() // trailing
	// standalone

	bar()
}
"#,
    );
    let block = find(&ast, |node| matches!(node, Node::Block(_)));
    let stmts = ast.children(block, Field::List);
    assert_eq!(stmts.len(), 3);
    let trailing = ast.data(stmts[0]).trailing.as_ref().expect("trailing");
    assert_eq!(trailing.text, "// trailing");
    assert!(matches!(ast.node(stmts[1]), Node::Comment(_)));
    assert!(ast.data(stmts[2]).blank_before);
}

#[test]
fn apply_visits_nodes_in_document_order() {
    let mut ast = parse("package p\n\nfunc f() {\n\ta := b + c\n}\n");
    let mut names = Vec::new();
    apply(&mut ast, |cursor| {
        if let Some(name) = cursor.ast().ident_name(cursor.node()) {
            names.push(name.to_string());
        }
        Ok(true)
    })
    .unwrap();
    assert_eq!(names, vec!["p", "f", "a", "b", "c"]);
}

#[test]
fn apply_skips_subtrees_when_asked() {
    let mut ast = parse("package p\n\nfunc f() {\n\ta := b + c\n}\n");
    let mut names = Vec::new();
    apply(&mut ast, |cursor| {
        let node = cursor.node();
        if let Some(name) = cursor.ast().ident_name(node) {
            names.push(name.to_string());
        }
        Ok(!matches!(cursor.ast().node(node), Node::Binary(_)))
    })
    .unwrap();
    assert_eq!(names, vec!["p", "f", "a"]);
}

#[test]
fn replace_rewrites_the_exact_slot() {
    let mut ast = parse("package p\n\nfunc f() {\n\tfoo(x)\n\n\tbar(y)\n}\n");
    apply(&mut ast, |cursor| {
        let node = cursor.node();
        if !call_named(cursor.ast(), node, "bar") {
            return Ok(true);
        }
        let ast = cursor.ast_mut();
        let Node::ExprStmt(stmt) = ast.node(node) else {
            unreachable!()
        };
        let Node::Call(call) = ast.node(stmt.x) else {
            unreachable!()
        };
        let args = call.args.clone();
        let pkg = ast.ident("baz");
        let fun = ast.selector(pkg, "Qux");
        let call = ast.call(fun, args);
        let replacement = ast.expr_stmt(call);
        assert!(cursor.in_list());
        cursor.replace(replacement)?;
        Ok(true)
    })
    .unwrap();
    assert_eq!(
        print(&ast),
        "package p\n\nfunc f() {\n\tfoo(x)\n\n\tbaz.Qux(y)\n}\n"
    );
}

#[test]
fn inserted_statements_are_not_visited() {
    let mut ast = parse("package p\n\nfunc f() {\n\tfoo()\n\tbar()\n}\n");
    let mut visited = Vec::new();
    apply(&mut ast, |cursor| {
        let node = cursor.node();
        for name in ["foo", "bar", "baz"] {
            if call_named(cursor.ast(), node, name) {
                visited.push(name);
            }
        }
        if call_named(cursor.ast(), node, "foo") {
            let ast = cursor.ast_mut();
            let fun = ast.ident("baz");
            let call = ast.call(fun, Vec::new());
            let stmt = ast.expr_stmt(call);
            cursor.insert_before(stmt)?;
        }
        Ok(true)
    })
    .unwrap();
    assert_eq!(visited, vec!["foo", "bar"]);
    assert_eq!(
        print(&ast),
        "package p\n\nfunc f() {\n\tbaz()\n\tfoo()\n\tbar()\n}\n"
    );
}

#[test]
fn add_import_starts_a_group_for_third_party_paths() {
    let mut ast = parse(
        "package p\n\nimport (\n\t\"errors\"\n\t\"log\"\n)\n\nfunc f() {}\n",
    );
    assert!(astutil::add_import(&mut ast, "github.com/Originate/exit").unwrap());
    assert!(!astutil::add_import(&mut ast, "github.com/Originate/exit").unwrap());
    assert_eq!(
        print(&ast),
        "package p\n\nimport (\n\t\"errors\"\n\t\"log\"\n\n\t\"github.com/Originate/exit\"\n)\n\nfunc f() {}\n"
    );
}

#[test]
fn add_import_sorts_within_the_group() {
    let mut ast = parse("package p\n\nimport \"os\"\n\nfunc f() {}\n");
    assert!(astutil::add_import(&mut ast, "fmt").unwrap());
    assert_eq!(
        print(&ast),
        "package p\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc f() {}\n"
    );
}

#[test]
fn add_import_creates_a_declaration_when_missing() {
    let mut ast = parse("package p\n\nfunc f() {}\n");
    assert!(astutil::add_import(&mut ast, "fmt").unwrap());
    assert_eq!(
        print(&ast),
        "package p\n\nimport \"fmt\"\n\nfunc f() {}\n"
    );
}

#[test]
fn delete_import_drops_parentheses_and_empty_declarations() {
    let mut ast = parse(
        "package p\n\nimport (\n\t\"errors\"\n\t\"log\"\n)\n\nfunc f() {}\n",
    );
    assert!(astutil::delete_import(&mut ast, "log").unwrap());
    assert!(!astutil::delete_import(&mut ast, "log").unwrap());
    assert_eq!(
        print(&ast),
        "package p\n\nimport \"errors\"\n\nfunc f() {}\n"
    );

    assert!(astutil::delete_import(&mut ast, "errors").unwrap());
    assert_eq!(print(&ast), "package p\n\nfunc f() {}\n");
}

#[test]
fn uses_import_looks_into_verbatim_syntax() {
    let ast = parse(
        r#"package p

import (
	"fmt"
	"log"
)

func f() {
	_ = []interface{}{log.Println}
}
"#,
    );
    assert!(astutil::uses_import(&ast, "log"));
    assert!(!astutil::uses_import(&ast, "fmt"));
    assert!(!astutil::uses_import(&ast, "os"));
}

#[test]
fn import_local_name_prefers_the_alias() {
    let ast = parse("package p\n\nimport (\n\tl \"log\"\n\t\"net/http\"\n)\n");
    let names: Vec<_> = astutil::imports(&ast)
        .into_iter()
        .filter_map(|import| astutil::import_local_name(&ast, import.spec))
        .collect();
    assert_eq!(names, vec!["l", "http"]);
    assert_eq!(
        astutil::find_import(&ast, "log").map(|import| import.index),
        Some(0)
    );
}

#[test]
fn function_literal_bodies_are_walked() {
    let source = r#"package p

func f(t *T) {
	go func(err error) {
		if err != nil {
			report(err)
		}
	}(g())
	t.Run("x", func(t *T) {
		report(nil)
	})
}
"#;
    let mut ast = parse(source);
    assert_eq!(checked_objs(&ast), vec![Some(ObjKind::Var)]);
    rename(&mut ast, "report", "check");
    assert_eq!(print(&ast), source.replace("report", "check"));
}

#[test]
fn type_switch_clauses_are_walked() {
    let source = r#"package p

func f(x interface{}) {
	switch v := x.(type) {
	case int, int64:
		report(v)
	case error:
		if v != nil {
			report(v)
		}
	default:
		report(nil)
	}
}
"#;
    let mut ast = parse(source);
    let switch = find(&ast, |node| matches!(node, Node::TypeSwitch(_)));
    assert_eq!(ast.children(switch, Field::Body).len(), 3);
    assert_eq!(checked_objs(&ast), vec![Some(ObjKind::Var)]);
    rename(&mut ast, "report", "check");
    assert_eq!(print(&ast), source.replace("report", "check"));
}

#[test]
fn select_clauses_are_walked() {
    let source = r#"package p

func f(errs chan error, done chan bool) {
	for {
		select {
		case err := <-errs:
			if err != nil {
				report(err)
			}
		case done <- true:
			report(nil)
		}
	}
}
"#;
    let mut ast = parse(source);
    assert!(matches!(
        ast.node(find(&ast, |node| matches!(node, Node::Select(_)))),
        Node::Select(select) if select.clauses.len() == 2
    ));
    assert_eq!(checked_objs(&ast), vec![Some(ObjKind::Var)]);
    rename(&mut ast, "report", "check");
    assert_eq!(print(&ast), source.replace("report", "check"));
}

#[test]
fn untouched_labelled_statements_keep_their_depth() {
    let source = r#"package p

func f() {
	report(1)
L:
	for {
		q := `a
b`
		if q != "" {
			break L
		}
	}
}
"#;
    let mut ast = parse(source);
    rename(&mut ast, "report", "check");
    assert_eq!(print(&ast), source.replace("report", "check"));
}

#[test]
fn reindenting_leaves_raw_strings_alone() {
    let mut ast = parse(
        "package p\n\nfunc f() {\n    report(2)\n    s := `line1\n    line2`\n    use(s)\n}\n",
    );
    assert!(ast.in_raw_string(ast.source().find("line2").unwrap()));
    assert!(!ast.in_raw_string(ast.source().find("use").unwrap()));
    rename(&mut ast, "report", "check");
    assert_eq!(
        print(&ast),
        "package p\n\nfunc f() {\n\tcheck(2)\n\ts := `line1\n    line2`\n\tuse(s)\n}\n"
    );
}

#[test]
fn delete_import_takes_its_comment_along() {
    let mut ast = parse(
        "package p\n\nimport ( // logging\n\t\"log\"\n\t\"os\"\n)\n\nfunc f() {}\n",
    );
    assert!(astutil::delete_import(&mut ast, "log").unwrap());
    assert_eq!(print(&ast), "package p\n\nimport \"os\"\n\nfunc f() {}\n");

    let mut ast = parse(
        "package p\n\nimport (\n\t\"errors\"\n\n\t// logging\n\t\"log\"\n\t\"os\"\n)\n\nfunc f() {}\n",
    );
    assert!(astutil::delete_import(&mut ast, "log").unwrap());
    assert_eq!(
        print(&ast),
        "package p\n\nimport (\n\t\"errors\"\n\n\t\"os\"\n)\n\nfunc f() {}\n"
    );
}
