//! Comprehensive tests for the AST module
//!
//! These tests verify that trees built through the combinators have the
//! expected shape and render to the expected SQL text.

use super::*;

fn col(name: &str) -> Expr {
    Expr::column(name)
}

fn stripped() -> RenderConfig {
    RenderConfig::default().with_strip_parentheses(true)
}

mod expr_tests {
    use super::*;

    #[test]
    fn test_literal_expressions() {
        assert_eq!(render_expr(&Expr::null()), "null");
        assert_eq!(render_expr(&Expr::bool(false)), "false");
        assert_eq!(render_expr(&Expr::int(42)), "42");
        assert_eq!(render_expr(&Expr::string("hello")), "'hello'");
        assert_eq!(render_expr(&Expr::literal(None::<i32>)), "null");
        assert_eq!(render_expr(&Expr::literal('x')), "'x'");
    }

    #[test]
    fn test_qualified_columns() {
        let t = Table::named("users");
        let expr = t.col("email").eq("a@b.c");
        assert_eq!(render_expr(&expr), "a.email = 'a@b.c'");

        let aliased = Table::named("users").with_alias("u");
        assert_eq!(render_expr(&aliased.wildcard()), "u.*");
        assert_eq!(render_expr(&Expr::wildcard()), "*");
    }

    #[test]
    fn test_arithmetic_in_call_order() {
        let expr = col("a").plus(col("b")).multiply(col("c"));
        assert_eq!(render_expr(&expr), "a + b * c");

        let expr = col("a")
            .multiply(col("b"))
            .plus(col("c"))
            .multiply(col("d"));
        assert_eq!(render_expr(&expr), "a * b + c * d");

        let expr = col("a").minus(col("b")).multiply(col("c")).divide(col("d"));
        assert_eq!(render_expr(&expr), "a - b * c / d");

        let expr = col("first").concat(" ").concat(col("last"));
        assert_eq!(render_expr(&expr), "first || ' ' || last");

        let expr = col("a").modulo(2).eq(0);
        assert_eq!(render_expr(&expr), "a % 2 = 0");
    }

    #[test]
    fn test_logical_grouping() {
        let expr = col("x").or(col("y")).and(col("z"));
        assert_eq!(render_expr_with(&expr, &stripped()), "x or (y and z)");

        let expr = col("x").and(col("y")).or(col("z"));
        assert_eq!(render_expr_with(&expr, &stripped()), "(x and y) or z");

        let expr = col("x").or(col("y")).and(col("z")).or(col("w"));
        assert_eq!(
            render_expr_with(&expr, &stripped()),
            "x or (y and z) or w"
        );
    }

    #[test]
    fn test_logical_flattening() {
        let expr = col("x").and(col("y")).and(col("z"));
        assert_eq!(render_expr_with(&expr, &stripped()), "x and y and z");

        let expr = col("x").and(col("y").and(col("z")));
        assert_eq!(render_expr_with(&expr, &stripped()), "x and y and z");

        let expr = col("x").or(col("y")).or(col("z").or(col("w")));
        assert_eq!(render_expr_with(&expr, &stripped()), "x or y or z or w");

        // AND into an OR whose last operand is already an AND extends it
        let expr = col("x").or(col("y").and(col("z"))).and(col("w"));
        assert_eq!(
            render_expr_with(&expr, &stripped()),
            "x or (y and z and w)"
        );
    }

    #[test]
    fn test_nested_is_a_barrier() {
        let expr = col("x").and(col("y")).nested().and(col("z"));
        assert_eq!(render_expr_with(&expr, &stripped()), "(x and y) and z");

        let expr = col("x").or(col("y")).nested().and(col("z"));
        assert_eq!(render_expr_with(&expr, &stripped()), "(x or y) and z");
    }

    #[test]
    fn test_root_parentheses_follow_config() {
        let expr = col("x").and(col("y"));
        assert_eq!(render_expr(&expr), "(x and y)");
        assert_eq!(render_expr_with(&expr, &stripped()), "x and y");

        // a single comparison never gets parentheses
        assert_eq!(render_expr(&col("x").eq(1)), "x = 1");
    }

    #[test]
    fn test_predicates_with_arithmetic_operands() {
        let expr = col("a").plus(1).between(col("b"), col("c").multiply(2));
        assert_eq!(render_expr(&expr), "a + 1 between b and c * 2");

        let expr = col("a").multiply(col("b")).is_null();
        assert_eq!(render_expr(&expr), "a * b is null");

        let expr = col("name").not_like("x%");
        assert_eq!(render_expr(&expr), "name not like 'x%'");

        let expr = col("a").not_between(1, 2);
        assert_eq!(render_expr(&expr), "a not between 1 and 2");
    }

    #[test]
    fn test_subquery_predicates() {
        let t = Table::named("t");
        let u = Table::named("u");

        let stmt = select().from(&t).with_where(
            t.col("id")
                .in_query(select().column(u.col("tid")).from(&u)),
        );
        assert_eq!(
            render(&stmt.into()),
            "select * from t a where a.id in (select b.tid from u b)"
        );

        let t = Table::named("t");
        let u = Table::named("u");
        let stmt = select().from(&t).with_where(Expr::exists(
            select().from(&u).with_where(u.col("tid").eq(t.col("id"))),
        ));
        assert_eq!(
            render(&stmt.into()),
            "select * from t a where exists (select * from u b where b.tid = a.id)"
        );

        let t = Table::named("t");
        let u = Table::named("u");
        let stmt = select().from(&t).with_where(
            t.col("x")
                .gt(Expr::all(select().column(u.col("y")).from(&u))),
        );
        assert_eq!(
            render(&stmt.into()),
            "select * from t a where a.x > all (select b.y from u b)"
        );

        let expr = Expr::not_exists(select().column(Expr::int(1)));
        assert_eq!(render_expr(&expr), "not exists (select 1)");

        let expr = col("total").eq(Expr::subquery(
            select().column(Expr::function("max", vec![col("total")])),
        ));
        assert_eq!(render_expr(&expr), "total = (select max(total))");
    }

    #[test]
    fn test_cast_targets() {
        let expr = col("m").cast(SqlType::custom("mood").with_schema("app"));
        assert_eq!(
            render_expr_with(&expr, &RenderConfig::postgres()),
            "cast(\"m\" as \"app\".\"mood\")"
        );

        let expr = col("ids").cast("int8[]".parse().unwrap());
        let upper = RenderConfig::default().with_keyword_case(KeywordCase::Upper);
        assert_eq!(render_expr_with(&expr, &upper), "CAST(ids AS BIGINT[])");
    }

    #[test]
    fn test_collate_keeps_operand_grouping() {
        let expr = col("a").concat(col("b")).collate("C");
        assert_eq!(render_expr(&expr), "(a || b) collate C");

        let expr = Expr::function("lower", vec![col("name")]).collate("C");
        assert_eq!(render_expr(&expr), "lower(name) collate C");
    }

    #[test]
    fn test_concat_next_to_additive_operators() {
        let concat = Expr::arithmetic(col("a"), ArithmeticOperator::Concat, col("b"));
        let expr = Expr::arithmetic(concat, ArithmeticOperator::Plus, col("c"));
        assert_eq!(render_expr(&expr), "(a || b) + c");

        let expr = col("a").plus(col("b")).concat(col("c"));
        assert_eq!(render_expr(&expr), "(a + b) || c");

        let expr = col("a").concat(col("b")).concat(col("c"));
        assert_eq!(render_expr(&expr), "a || b || c");

        let expr = col("a").multiply(col("b")).concat(col("c"));
        assert_eq!(render_expr(&expr), "a * b || c");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(render_expr(&Expr::literal(f64::NAN)), "'NaN'");
        assert_eq!(render_expr(&Expr::literal(f64::INFINITY)), "'Infinity'");
        assert_eq!(render_expr(&Expr::literal(f64::NEG_INFINITY)), "'-Infinity'");
        assert_eq!(render_expr(&Expr::literal(1.5)), "1.5");
    }

    #[test]
    fn test_apply() {
        let expr = Expr::apply(
            Operator::from_keyword("+").unwrap(),
            vec![col("a"), Expr::int(1)],
        )
        .unwrap();
        assert_eq!(render_expr(&expr), "a + 1");

        let expr = Expr::apply(
            Operator::Quantified(Quantifier::Any),
            vec![Expr::subquery(select().column(Expr::int(1)))],
        )
        .unwrap();
        assert_eq!(render_expr(&expr), "any (select 1)");

        let expr = Expr::apply(
            Operator::from_keyword("or").unwrap(),
            vec![col("a"), col("b"), col("c")],
        )
        .unwrap();
        assert_eq!(render_expr_with(&expr, &stripped()), "a or b or c");

        let err = Expr::apply(Operator::Exists, vec![col("a"), col("b")]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidOperatorArity { .. }));
    }
}

mod stmt_tests {
    use super::*;

    #[test]
    fn test_where_scenario() {
        let t = Table::named("t");
        let stmt = select().from(&t).with_where(t.col("a").eq(5));
        assert_eq!(render(&stmt.into()), "select * from t a where a.a = 5");
    }

    #[test]
    fn test_render_is_idempotent() {
        let t = Table::named("t");
        let u = Table::named("u");
        let stmt: Stmt = select()
            .column(t.col("id"))
            .column(u.col("id"))
            .from(&t)
            .join(Join::left(&u, t.col("id"), u.col("tid")))
            .with_where(t.col("x").eq(Placeholder::new(1)))
            .into();

        let config = RenderConfig::postgres();
        let first = render_with(&stmt, &config);
        let second = render_with(&stmt, &config);
        assert_eq!(first, second);
        assert_eq!(
            first,
            "select \"a\".\"id\", \"b\".\"id\" from \"t\" \"a\" left join \"u\" \"b\" on \"a\".\"id\" = \"b\".\"tid\" where \"a\".\"x\" = $1"
        );
    }

    #[test]
    fn test_concurrent_renders_do_not_share_aliases() {
        let t = Table::named("t");
        let stmt: Stmt = select().from(&t).with_where(t.col("a").eq(5)).into();
        let expected = "select * from t a where a.a = 5";

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| render(&stmt))).collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_self_join_gets_distinct_aliases() {
        let child = Table::named("t");
        let parent = Table::named("t");
        let stmt = select()
            .column(child.col("id"))
            .column(parent.col("id"))
            .from(&child)
            .join(Join::inner(&parent, child.col("parent_id"), parent.col("id")));
        assert_eq!(
            render(&stmt.into()),
            "select a.id, b.id from t a inner join t b on a.parent_id = b.id"
        );
    }

    #[test]
    fn test_alias_sequence_past_26() {
        let tables: Vec<Table> = (0..28).map(|i| Table::named(format!("t{}", i))).collect();
        let stmt = tables.iter().fold(select(), |stmt, t| stmt.from(t));
        let sql = render(&stmt.into());

        assert!(sql.contains("t0 a, t1 b,"));
        assert!(sql.contains("t25 z, t26 a1, t27 b1"));
    }

    #[test]
    fn test_explicit_alias() {
        let t = Table::named("users").with_schema("public").with_alias("u");
        let stmt = select().column(t.col("id")).from(&t);
        assert_eq!(render(&stmt.into()), "select u.id from public.users u");
    }

    #[test]
    fn test_generated_aliases_avoid_explicit_ones() {
        let t1 = Table::named("t1").with_alias("a");
        let t2 = Table::named("t2");
        let stmt = select().from(&t1).from(&t2);
        assert_eq!(render(&stmt.into()), "select * from t1 a, t2 b");

        // the explicit alias appears after the generated one would have
        let t1 = Table::named("t1");
        let t2 = Table::named("t2").with_alias("A");
        let stmt = select().from(&t1).from(&t2);
        assert_eq!(render(&stmt.into()), "select * from t1 b, t2 A");

        let u = Table::named("u");
        let cte = Cte::named("a", select().from(&u));
        let stmt = select().from(&cte.table()).with_cte(&cte);
        assert_eq!(
            render(&stmt.into()),
            "with a as (select * from u b) select * from a c"
        );
    }

    #[test]
    fn test_explicit_alias_in_condition_only_expression() {
        let t = Table::named("t").with_alias("a");
        let u = Table::named("u");
        let expr = t.col("id").eq(u.col("tid"));
        assert_eq!(render_expr(&expr), "a.id = b.tid");
    }

    #[test]
    fn test_join_conditions() {
        let t = Table::named("t");
        let u = Table::named("u");
        let stmt = select().from(&t).join(
            Join::inner(&u, t.col("id"), u.col("tid")).and(u.col("active").eq(true)),
        );
        assert_eq!(
            render(&stmt.clone().into()),
            "select * from t a inner join u b on (a.id = b.tid and b.active = true)"
        );
        assert_eq!(
            render_with(&stmt.into(), &stripped()),
            "select * from t a inner join u b on a.id = b.tid and b.active = true"
        );

        let t = Table::named("t");
        let u = Table::named("u");
        let stmt = select().from(&t).join(Join::cross(&u));
        assert_eq!(render(&stmt.into()), "select * from t a cross join u b");
    }

    #[test]
    fn test_where_list_is_and_combined() {
        let t = Table::named("t");
        let stmt = select()
            .from(&t)
            .with_where(t.col("x").eq(1))
            .with_where(t.col("y").eq(2).or(t.col("z").eq(3)));
        assert_eq!(
            render_with(&stmt.into(), &stripped()),
            "select * from t a where a.x = 1 and (a.y = 2 or a.z = 3)"
        );
    }

    #[test]
    fn test_select_clauses() {
        let t = Table::named("orders");
        let stmt = select()
            .hint("/*+ parallel */")
            .distinct()
            .column(t.col("customer"))
            .column_as(FunctionCall::count_star(), "n")
            .from(&t)
            .group_by(t.col("customer"))
            .having(Expr::from(FunctionCall::count_star()).gt(1))
            .order_by(OrderByExpr::desc(t.col("customer")).with_nulls(NullsOrder::Last))
            .offset(20)
            .fetch(10);
        assert_eq!(
            render(&stmt.into()),
            "select /*+ parallel */ distinct a.customer, count(*) as n from orders a \
             group by a.customer having count(*) > 1 order by a.customer desc nulls last \
             offset 20 rows fetch next 10 rows only"
        );
    }

    #[test]
    fn test_union_scenario() {
        let a = Table::named("a_table");
        let b = Table::named("b_table");
        let stmt = SetOperationStmt::union(
            select()
                .column(a.col("id"))
                .from(&a)
                .with_where(a.col("x").gt(1)),
            select().column(b.col("id")).from(&b),
        )
        .order_by(OrderByExpr::asc(col("id")))
        .offset(5)
        .fetch(10);
        let stmt: Stmt = stmt.into();

        assert_eq!(
            render(&stmt),
            "(select a.id from a_table a where a.x > 1) union (select b.id from b_table b) \
             order by id asc offset 5 rows fetch next 10 rows only"
        );

        let upper = RenderConfig::default().with_keyword_case(KeywordCase::Upper);
        assert_eq!(
            render_with(&stmt, &upper),
            "(SELECT a.id FROM a_table a WHERE a.x > 1) UNION (SELECT b.id FROM b_table b) \
             ORDER BY id ASC OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_union_all_and_intersect() {
        let stmt = SetOperationStmt::union_all(
            select().column(Expr::int(1)),
            select().column(Expr::int(2)),
        )
        .and_select(select().column(Expr::int(3)));
        assert_eq!(
            render(&stmt.into()),
            "(select 1) union all (select 2) union all (select 3)"
        );

        let stmt = SetOperationStmt::intersect(
            select().column(Expr::int(1)),
            select().column(Expr::int(1)),
        );
        assert_eq!(render(&stmt.into()), "(select 1) intersect (select 1)");
    }

    #[test]
    fn test_update() {
        let t = Table::named("t");
        let stmt = UpdateStmt::builder()
            .table(&t)
            .set("name", "x")
            .set("n", t.col("n").plus(1))
            .with_where(t.col("id").eq(3))
            .build()
            .unwrap();
        assert_eq!(
            render(&stmt.into()),
            "update t a set name = 'x', n = a.n + 1 where a.id = 3"
        );
    }

    #[test]
    fn test_update_with_cte() {
        let src = Table::named("staging");
        let cte = Cte::named("fresh", select().column(src.col("id")).from(&src));
        let t = Table::named("t");
        let stmt = UpdateStmt::builder()
            .with_cte(&cte)
            .table(&t)
            .set("seen", true)
            .with_where(
                t.col("id")
                    .in_query(select().column(cte.table().col("id")).from(&cte.table())),
            )
            .build()
            .unwrap();
        assert_eq!(
            render(&stmt.into()),
            "with fresh as (select a.id from staging a) update t b set seen = true \
             where b.id in (select c.id from fresh c)"
        );
    }

    #[test]
    fn test_update_requires_table() {
        let err = UpdateStmt::builder().set("a", 1).build().unwrap_err();
        assert!(matches!(err, crate::Error::NullArgument(_)));
    }

    #[test]
    fn test_named_cte() {
        let users = Table::named("users");
        let cte = Cte::named(
            "active",
            select().from(&users).with_where(users.col("active").eq(true)),
        );
        let view = cte.table();
        let stmt = select().column(view.col("id")).from(&view).with_cte(&cte);
        assert_eq!(
            render(&stmt.into()),
            "with active as (select * from users a where a.active = true) select b.id from active b"
        );
    }

    #[test]
    fn test_unnamed_cte_is_allocated() {
        let u = Table::named("u");
        let cte = Cte::new(select().from(&u));
        let stmt = select().from(&cte.table()).with_cte(&cte);
        assert_eq!(
            render(&stmt.into()),
            "with a as (select * from u b) select * from a c"
        );
    }

    #[test]
    fn test_recursive_cte_and_self_join() {
        let cte = Cte::named("nums", select().column(Expr::int(1))).with_columns(["n"]);
        let left = cte.table();
        let right = cte.reference();
        let stmt = select()
            .recursive()
            .with_cte(&cte)
            .column(left.col("n"))
            .from(&left)
            .join(Join::inner(&right, left.col("n"), right.col("n")));
        assert_eq!(
            render(&stmt.into()),
            "with recursive nums(n) as (select 1) select a.n from nums a inner join nums b on a.n = b.n"
        );
    }

    #[test]
    fn test_derived_tables() {
        let t = Table::named("t");
        let u = Table::named("users");
        let sub = Table::from_query(select().column(u.col("id")).from(&u)).lateral();
        let stmt = select().from(&t).from(&sub);
        assert_eq!(
            render(&stmt.into()),
            "select * from t a, lateral (select b.id from users b) c"
        );

        let derived = Table::from_query(select()).with_alias("d");
        let stmt = select().column(derived.col("x")).from(&derived);
        assert_eq!(render(&stmt.into()), "select d.x from (select *) d");
    }

    #[test]
    fn test_inline_window() {
        let t = Table::named("emp");
        let w = Window::new()
            .partition_by(t.col("dept"))
            .order_by(OrderByExpr::desc(t.col("salary")));
        let stmt = select()
            .column_as(FunctionCall::new("rank", vec![]).over(&w), "r")
            .from(&t);
        assert_eq!(
            render(&stmt.into()),
            "select rank() over (partition by a.dept order by a.salary desc) as r from emp a"
        );
    }

    #[test]
    fn test_named_window_clause() {
        let t = Table::named("emp");
        let w = Window::named("w").partition_by(t.col("dept"));
        let stmt = select()
            .column(FunctionCall::new("row_number", vec![]).over(&w))
            .from(&t)
            .window(&w);
        assert_eq!(
            render(&stmt.into()),
            "select row_number() over w from emp a window w as (partition by a.dept)"
        );
    }

    #[test]
    fn test_unnamed_window_in_clause_is_allocated() {
        let t = Table::named("emp");
        let w = Window::new().order_by(OrderByExpr::new(t.col("id")));
        let stmt = select()
            .column(FunctionCall::new("row_number", vec![]).over(&w))
            .from(&t)
            .window(&w);
        assert_eq!(
            render(&stmt.into()),
            "select row_number() over a from emp b window a as (order by b.id)"
        );
    }

    #[test]
    fn test_window_base_and_frames() {
        let t = Table::named("emp");
        let base = Window::named("w").partition_by(t.col("dept"));
        let w = Window::new()
            .with_base(&base)
            .order_by(OrderByExpr::new(t.col("id")))
            .with_frame(Frame::between(
                FrameUnits::Rows,
                FrameBound::preceding(1),
                FrameBound::current_row(),
            ));
        let stmt = select()
            .column(FunctionCall::new("sum", vec![t.col("x")]).over(&w))
            .from(&t)
            .window(&base);
        assert_eq!(
            render(&stmt.into()),
            "select sum(a.x) over (w order by a.id rows between 1 preceding and current row) \
             from emp a window w as (partition by a.dept)"
        );

        let w = Window::new().with_frame(Frame::new(
            FrameUnits::Range,
            FrameBound::unbounded_preceding(),
        ));
        let expr = FunctionCall::new("count", vec![col("x")]).over(&w);
        assert_eq!(render_expr(&expr), "count(x) over (range unbounded preceding)");

        let w = Window::new().with_frame(Frame::between(
            FrameUnits::Groups,
            FrameBound::current_row(),
            FrameBound::new(BoundKind::Following, Some(Expr::int(2))).unwrap(),
        ));
        let expr = FunctionCall::new("count", vec![col("x")]).over(&w);
        assert_eq!(
            render_expr(&expr),
            "count(x) over (groups between current row and 2 following)"
        );
    }

    #[test]
    fn test_pretty_output() {
        let t = Table::named("t");
        let stmt = select().column(t.col("id")).from(&t).with_where(t.col("id").eq(1));
        assert_eq!(
            render_pretty(&stmt.into()),
            "select a.id\nfrom t a\nwhere a.id = 1"
        );

        let u = Table::named("u");
        let cte = Cte::named("c", select().from(&u));
        let stmt = select().from(&cte.table()).with_cte(&cte);
        assert_eq!(
            render_pretty(&stmt.into()),
            "with c as (\n    select *\n    from u a\n)\nselect *\nfrom c b"
        );
    }

    #[test]
    fn test_config_from_json() {
        let config = RenderConfig::from_json(
            r#"{"keywordCase": "upper", "identifierDelimiter": "\"", "stripParentheses": true}"#,
        )
        .unwrap();
        let t = Table::named("t");
        let stmt = select()
            .from(&t)
            .with_where(t.col("x").eq(1))
            .with_where(t.col("y").eq(2));
        assert_eq!(
            render_with(&stmt.into(), &config),
            "SELECT * FROM \"t\" \"a\" WHERE \"a\".\"x\" = 1 AND \"a\".\"y\" = 2"
        );
    }

    #[test]
    fn test_custom_allocator() {
        struct Numbered(usize);

        impl AliasAllocator for Numbered {
            fn next(&mut self) -> String {
                self.0 += 1;
                format!("t{}", self.0)
            }

            fn current(&self) -> Option<String> {
                (self.0 > 0).then(|| format!("t{}", self.0))
            }

            fn reset(&mut self) {
                self.0 = 0;
            }
        }

        let config = RenderConfig::default().with_allocator(|| Box::new(Numbered(0)));
        let a = Table::named("a");
        let b = Table::named("b");
        let stmt = select().from(&a).from(&b);
        assert_eq!(render_with(&stmt.into(), &config), "select * from a t1, b t2");
    }
}

mod params_tests {
    use super::*;

    #[test]
    fn test_placeholder_order_scenario() {
        let expr = col("col1")
            .eq(Placeholder::new(1))
            .and(col("col2").gt(Placeholder::new(2)));
        let values: Vec<Literal> = collect_expr_placeholders(&expr)
            .iter()
            .map(Placeholder::value)
            .collect();
        assert_eq!(values, vec![Literal::Integer(1), Literal::Integer(2)]);
    }

    #[test]
    fn test_statement_order_matches_text() {
        let t = Table::named("t");
        let u = Table::named("u");
        let p_proj = Placeholder::new("proj");
        let p_sub = Placeholder::new("sub");
        let p_join = Placeholder::new("join");
        let p_where = Placeholder::new("where");
        let p_fetch = Placeholder::new(10);

        let sub = Table::from_query(select().from(&u).with_where(u.col("k").eq(&p_sub)));
        let stmt: Stmt = select()
            .fetch(&p_fetch)
            .with_where(t.col("w").eq(&p_where))
            .column(&p_proj)
            .from(&t)
            .join(Join::inner(&sub, t.col("id"), sub.col("id")).and(sub.col("v").eq(&p_join)))
            .into();

        assert_eq!(
            collect_placeholders(&stmt),
            vec![p_proj, p_sub, p_join, p_where, p_fetch]
        );
        assert_eq!(
            render_with(&stmt, &RenderConfig::default().with_marker(NumberedMarker)),
            "select $1 from t a inner join (select * from u b where b.k = $2) c \
             on (a.id = c.id and c.v = $3) where a.w = $4 fetch next $5 rows only"
        );
    }

    #[test]
    fn test_params_follow_rebinding() {
        let t = Table::named("t");
        let p = Placeholder::named("id", 1);
        let stmt: Stmt = select().from(&t).with_where(t.col("id").eq(&p)).into();

        p.bind(42);
        let bound = params(&stmt);
        assert_eq!(
            bound,
            vec![Param {
                index: 1,
                value: Literal::Integer(42),
                name: Some("id".to_string()),
            }]
        );
        assert_eq!(
            render_with(&stmt, &RenderConfig::default().with_marker(NamedMarker)),
            "select * from t a where a.id = :id"
        );
    }

    #[test]
    fn test_declared_window_is_visited_at_clause() {
        let t = Table::named("t");
        let p_where = Placeholder::new("w");
        let p_win = Placeholder::new("p");
        let p_order = Placeholder::new("o");
        let w = Window::named("w").partition_by(&p_win);

        let stmt: Stmt = select()
            .column(FunctionCall::new("rank", vec![]).over(&w))
            .from(&t)
            .with_where(t.col("a").eq(&p_where))
            .window(&w)
            .order_by(OrderByExpr::new(&p_order))
            .into();
        assert_eq!(
            collect_placeholders(&stmt),
            vec![p_where.clone(), p_win.clone(), p_order]
        );
        assert_eq!(
            render_with(&stmt, &RenderConfig::postgres().with_identifier_delimiter("")),
            "select rank() over w from t a where a.a = $1 window w as (partition by $2) order by $3"
        );

        let stmt: Stmt = select()
            .column(FunctionCall::new("rank", vec![]).over(&w))
            .from(&t)
            .with_where(t.col("a").eq(&p_where))
            .into();
        assert_eq!(collect_placeholders(&stmt), vec![p_win, p_where]);
    }

    #[test]
    fn test_update_params() {
        let t = Table::named("t");
        let value = Placeholder::new("v");
        let key = Placeholder::new(7);
        let stmt: Stmt = UpdateStmt::builder()
            .table(&t)
            .set("name", &value)
            .with_where(t.col("id").eq(&key))
            .build()
            .unwrap()
            .into();
        assert_eq!(collect_placeholders(&stmt), vec![value, key]);
    }
}

mod precedence_tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Token {
        Num(i64),
        Op(char),
        Open,
        Close,
    }

    fn tokenize(sql: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut chars = sql.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ' ' => {}
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                '+' | '-' | '*' => tokens.push(Token::Op(c)),
                '0'..='9' => {
                    let mut n = c.to_digit(10).unwrap() as i64;
                    while let Some(d) = chars.peek().and_then(|d| d.to_digit(10)) {
                        n = n * 10 + d as i64;
                        chars.next();
                    }
                    tokens.push(Token::Num(n));
                }
                other => panic!("unexpected character {:?} in {:?}", other, sql),
            }
        }
        tokens
    }

    fn precedence(op: char) -> u8 {
        if op == '*' {
            2
        } else {
            1
        }
    }

    fn apply(op: char, l: i64, r: i64) -> i64 {
        match op {
            '+' => l.wrapping_add(r),
            '-' => l.wrapping_sub(r),
            '*' => l.wrapping_mul(r),
            other => panic!("unexpected operator {:?}", other),
        }
    }

    /// Evaluate text under standard precedence (shunting-yard)
    fn eval_text(sql: &str) -> i64 {
        let mut output = Vec::new();
        let mut stack: Vec<Token> = Vec::new();
        for token in tokenize(sql) {
            match token {
                Token::Num(_) => output.push(token),
                Token::Op(op) => {
                    while let Some(Token::Op(top)) = stack.last() {
                        if precedence(*top) >= precedence(op) {
                            output.push(stack.pop().unwrap());
                        } else {
                            break;
                        }
                    }
                    stack.push(token);
                }
                Token::Open => stack.push(token),
                Token::Close => {
                    while let Some(top) = stack.pop() {
                        if top == Token::Open {
                            break;
                        }
                        output.push(top);
                    }
                }
            }
        }
        while let Some(top) = stack.pop() {
            output.push(top);
        }

        let mut values = Vec::new();
        for token in output {
            match token {
                Token::Num(n) => values.push(n),
                Token::Op(op) => {
                    let r = values.pop().unwrap();
                    let l = values.pop().unwrap();
                    values.push(apply(op, l, r));
                }
                other => panic!("unbalanced token {:?}", other),
            }
        }
        values.pop().unwrap()
    }

    /// Evaluate the tree structure directly
    fn eval_tree(expr: &Expr) -> i64 {
        match expr {
            Expr::Literal(Literal::Integer(n)) => *n,
            Expr::Grouping(inner) => eval_tree(inner),
            Expr::Arithmetic(node) => {
                let op = match node.op {
                    ArithmeticOperator::Plus => '+',
                    ArithmeticOperator::Minus => '-',
                    ArithmeticOperator::Multiply => '*',
                    other => panic!("unexpected operator {:?}", other),
                };
                apply(op, eval_tree(&node.left), eval_tree(&node.right))
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_random_call_orders() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..500 {
            let len = rng.gen_range(1..8);
            let first: i64 = rng.gen_range(0..10);
            let mut expr = Expr::int(first);
            let mut flat = first.to_string();

            for _ in 0..len {
                let operand: i64 = rng.gen_range(0..10);
                let op = ['+', '-', '*'][rng.gen_range(0..3)];
                expr = match op {
                    '+' => expr.plus(operand),
                    '-' => expr.minus(operand),
                    _ => expr.multiply(operand),
                };
                flat.push_str(&format!(" {} {}", op, operand));
            }

            let sql = render_expr(&expr);
            // the call sequence already reads with standard precedence
            assert_eq!(sql, flat);
            assert_eq!(eval_text(&sql), eval_tree(&expr), "tree for {}", flat);
        }
    }

    #[test]
    fn test_random_explicit_trees_keep_grouping() {
        let mut rng = StdRng::seed_from_u64(42);

        fn build(rng: &mut StdRng, depth: u32) -> Expr {
            if depth == 0 || rng.gen_bool(0.3) {
                return Expr::int(rng.gen_range(0..10));
            }
            let op = [
                ArithmeticOperator::Plus,
                ArithmeticOperator::Minus,
                ArithmeticOperator::Multiply,
            ][rng.gen_range(0..3)];
            Expr::arithmetic(build(rng, depth - 1), op, build(rng, depth - 1))
        }

        for _ in 0..300 {
            let expr = build(&mut rng, 4);
            let sql = render_expr(&expr);
            assert_eq!(eval_text(&sql), eval_tree(&expr), "rendered {}", sql);
        }
    }
}
