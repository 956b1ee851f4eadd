#[cfg(test)]
mod parser_tests {
    use objc_interpreter as objc;

    use objc::ast::{Expr, Stmt};
    use objc::ast_printer::AstPrinter;
    use objc::parser::Parser;
    use objc::scanner::scan_tokens;
    use pretty_assertions::assert_eq;

    /// Parse `source` and print it, one line per top-level statement.
    fn parse_to_string(source: &str) -> String {
        let scanned = scan_tokens(source);
        let mut parser = Parser::new(&scanned.tokens);
        let statements = parser.parse();

        assert!(
            !parser.had_error(),
            "unexpected parse errors: {:?}",
            parser.errors()
        );

        AstPrinter::print_program(&statements)
    }

    #[test]
    fn test_parser_01_variable_declarations() {
        assert_eq!(
            parse_to_string("int x = 1 + 2 * 3; string name; id thing = nil;"),
            "(varStmt int x (+ 1 (* 2 3)))\n(varStmt string name)\n(varStmt id thing nil)"
        );
    }

    #[test]
    fn test_parser_02_precedence_and_grouping() {
        assert_eq!(
            parse_to_string("print -(1 + 2) * 3 >= 4 == !NO;"),
            "(print (== (>= (* (- (group (+ 1 2))) 3) 4) (! NO)))"
        );
    }

    #[test]
    fn test_parser_03_logical_and_ternary() {
        assert_eq!(
            parse_to_string("print a && b || c ? \"yes\" : \"no\";"),
            "(print (ternary (|| (&& a b) c) \"yes\" \"no\"))"
        );
    }

    #[test]
    fn test_parser_04_function_declaration() {
        assert_eq!(
            parse_to_string("int add(int a, int b) { return a + b; }\nvoid hello(void);"),
            "(function add (a b) (return (+ a b)))\n(function hello ())"
        );
    }

    #[test]
    fn test_parser_05_control_flow() {
        let source = "
            if (x > 1) print x; else { print 0; }
            while (x < 10) x += 1;
            for (int i = 0; i < 3; i++) { print i; }
            for (;;) {}
        ";

        assert_eq!(
            parse_to_string(source),
            [
                "(if (> x 1) (print x) (block (print 0)))",
                "(while (< x 10) (assign x += 1))",
                "(for (varStmt int i 0) (< i 3) (assign i ++ 1) (block (print i)))",
                "(for _ _ _ (block))",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_parser_06_increments_become_assignments() {
        assert_eq!(
            parse_to_string("x++; ++y; o.count++; a[0]++; a[1] += 2; o.name = \"n\";"),
            [
                "(assign x ++ 1)",
                "(assign y ++ 1)",
                "(set count ++ o 1)",
                "(arraySet a 0 ++ 1)",
                "(arraySet a 1 += 2)",
                "(set name = o \"n\")",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_parser_07_message_sends() {
        assert_eq!(
            parse_to_string("[counter add: 1 to: 2];\nid p = [[Point alloc] init];\n[self reset];"),
            [
                "(call (get add counter) 1 2)",
                "(varStmt id p (call (get init (call (get alloc Point)))))",
                "(call (get reset self))",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_parser_08_array_literal_and_indexing() {
        assert_eq!(
            parse_to_string("id xs = @[1, \"two\", YES];\nprint xs[0][1];"),
            "(varStmt id xs (array 1 \"two\" YES))\n(print (arrayGet (arrayGet xs 0) 1))"
        );
    }

    #[test]
    fn test_parser_09_interface_and_implementation() {
        let source = "
            @interface Shape : NSObject
            @property (nonatomic) int sides;
            - (int)area;
            + (id)unit;
            @end

            @implementation Shape
            - (int)area { return sides * 2; }
            + (id)unit { return [[Shape alloc] init]; }
            - (void)resize:(int)w height:(int)h { print w + h; }
            @end
        ";

        assert_eq!(
            parse_to_string(source),
            [
                "(define Shape : NSObject (methods area unit) (properties (varStmt int sides)))",
                "(implement Shape (function area () (return (* sides 2))) (function +unit () (return (call (get init (call (get alloc Shape)))))) (function resize (w h) (print (+ w h))))",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_parser_10_instance_variables_and_protocols() {
        let source = "
            @interface Node : NSObject <NSCopying> {
                int value;
                Node *next;
            }
            @end
        ";

        assert_eq!(
            parse_to_string(source),
            "(define Node : NSObject (methods) (properties (varStmt int value) (varStmt Node next)))"
        );
    }

    #[test]
    fn test_parser_11_block_types_and_literals() {
        let source = "
            int (^add)(int, int) = ^int(int a, int b) { return a + b; };
            void (^log)(void) = ^{ print 1; };
        ";

        assert_eq!(
            parse_to_string(source),
            [
                "(varStmt (blockType int (int int)) add (blockExpr int (a b) (return (+ a b))))",
                "(varStmt (blockType void (void)) log (blockExpr _ () (print 1)))",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_parser_12_nested_block_type() {
        assert_eq!(
            parse_to_string("int (^(^makeAdder)(int))(int) = nil;"),
            "(varStmt (blockType (blockType int (int)) (int)) makeAdder nil)"
        );
    }

    #[test]
    fn test_parser_13_typedef_names_become_types() {
        let source = "
            typedef int (^Adder)(int);
            Adder inc = ^(int n) { return n + 1; };
        ";

        assert_eq!(
            parse_to_string(source),
            [
                "(typedef Adder (blockType int (int)))",
                "(varStmt Adder inc (blockExpr _ (n) (return (+ n 1))))",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_parser_14_directives_are_skipped() {
        let scanned = scan_tokens("#import <Foundation/Foundation.h>\nint x = 1;\n#pragma mark -\n");
        let statements: Vec<Stmt> = Parser::new(&scanned.tokens).parse();

        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Var(_)));
    }

    #[test]
    fn test_parser_15_class_name_expression_statement() {
        // A class name not followed by a declarator is an expression.
        let scanned = scan_tokens("@interface Foo : NSObject\n@end\nFoo;");
        let statements: Vec<Stmt> = Parser::new(&scanned.tokens).parse();

        assert_eq!(statements.len(), 2);
        assert!(matches!(
            &statements[1],
            Stmt::Expression(Expr::Variable { name, .. }) if name.lexeme == "Foo"
        ));
    }

    #[test]
    fn test_parser_16_error_sets_flag_and_reports_remaining_tokens() {
        let scanned = scan_tokens("print (1 + 2;\nprint 3;");
        let mut parser = Parser::new(&scanned.tokens);
        let statements = parser.parse();

        assert!(parser.had_error());
        // parsing stopped at the statement boundary after the error
        assert_eq!(statements.len(), 1);

        assert_eq!(parser.errors().len(), 1);
        assert_eq!(
            parser.errors()[0].to_string(),
            "[line 1] Error: at ';': Expected ')' after expression"
        );

        assert_eq!(
            parser.diagnostics().as_deref(),
            Some("Remaining tokens after error...\n[PRINT: print], [NUMBER: 3], [SEMICOLON: ;], [EOF: ], ")
        );
    }

    #[test]
    fn test_parser_17_no_diagnostics_without_errors() {
        let scanned = scan_tokens("print 1;");
        let mut parser = Parser::new(&scanned.tokens);
        parser.parse();

        assert!(!parser.had_error());
        assert!(parser.errors().is_empty());
        assert_eq!(parser.diagnostics(), None);
    }

    #[test]
    fn test_parser_18_invalid_assignment_target() {
        let scanned = scan_tokens("1 = 2;");
        let mut parser = Parser::new(&scanned.tokens);
        parser.parse();

        assert!(parser.had_error());
        assert!(parser.errors()[0]
            .to_string()
            .contains("Invalid assignment target"));
    }

    #[test]
    fn test_parser_19_printing_is_stable() {
        let source = "
            @interface Counter : NSObject
            @property int count;
            @end
            @implementation Counter
            - (void)bump { count++; }
            @end
            int (^twice)(int) = ^(int n) { return n * 2; };
            for (int i = 0; i < 3; i++) { print twice(i); }
        ";

        let first: String = parse_to_string(source);
        let second: String = parse_to_string(source);

        assert_eq!(first, second);

        // printing the same tree twice gives the same text
        let scanned = scan_tokens(source);
        let statements = Parser::new(&scanned.tokens).parse();
        assert_eq!(
            AstPrinter::print_program(&statements),
            AstPrinter::print_program(&statements)
        );
    }
}
