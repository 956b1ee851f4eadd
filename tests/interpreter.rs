#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::{self, Cursor, Write};
    use std::rc::Rc;

    use objc_interpreter as objc;

    use objc::error::ObjcError;
    use objc::interpreter::{Interpreter, ERROR_MARKER};
    use objc::parser::Parser;
    use objc::resolver::Resolver;
    use objc::scanner::scan_tokens;
    use objc::value::Value;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> String {
        objc::interpret_source(source)
    }

    /// Run `source` on `interpreter` and hand the interpreter back for
    /// inspection.
    fn run_with(mut interpreter: Interpreter, source: &str) -> Interpreter {
        let scanned = scan_tokens(source);
        let statements = Parser::new(&scanned.tokens).parse();

        Resolver::new(&mut interpreter).resolve(&statements);
        interpreter.interpret(&statements);

        interpreter
    }

    /// Writer whose contents stay readable after it is boxed.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ── expressions ─────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_01_arithmetic_precedence() {
        assert_eq!(run("print 3 + 4 * 2;"), "11\n");
        assert_eq!(run("print (3 + 4) * 2;"), "14\n");
        assert_eq!(run("print 10 / 4;"), "2.5\n");
        assert_eq!(run("print 7 % 3;"), "1\n");
        assert_eq!(run("print -2 - 3;"), "-5\n");
    }

    #[test]
    fn test_interpreter_02_plus_mixes_numbers_and_strings() {
        assert_eq!(run("print 1 + \"x\";"), "1x\n");
        assert_eq!(run("print \"x\" + 1;"), "x1\n");
        assert_eq!(run("print \"a\" + \"b\";"), "ab\n");
        assert_eq!(run("print \"n=\" + 2.5;"), "n=2.5\n");
        assert_eq!(run("print \"x\" + nil;"), "xnil\n");
    }

    #[test]
    fn test_interpreter_03_comparison_and_equality() {
        assert_eq!(run("print 1 < 2;"), "true\n");
        assert_eq!(run("print 2 <= 1;"), "false\n");
        assert_eq!(run("print 1 == 1;"), "true\n");
        assert_eq!(run("print \"a\" != \"b\";"), "true\n");
        assert_eq!(run("print nil == nil;"), "true\n");
        assert_eq!(run("print nil == NO;"), "false\n");
    }

    #[test]
    fn test_interpreter_04_truthiness() {
        // only nil and NO are false
        assert_eq!(
            run("if (0) { print \"yes\"; } else { print \"no\"; }"),
            "yes\n"
        );
        assert_eq!(run("if (\"\") print 1; else print 2;"), "1\n");
        assert_eq!(run("if (nil) print 1; else print 2;"), "2\n");
        assert_eq!(run("if (NO) print 1; else print 2;"), "2\n");
        assert_eq!(run("print !0;"), "false\n");
    }

    #[test]
    fn test_interpreter_05_logical_and_ternary() {
        assert_eq!(run("print nil || \"x\";"), "true\n");
        assert_eq!(run("print YES && NO;"), "false\n");
        assert_eq!(run("print 1 < 2 ? \"lt\" : \"ge\";"), "lt\n");

        // the right operand is skipped when the left decides
        assert_eq!(run("int n = 0; NO && (n = 1); YES || (n = 2); print n;"), "0\n");
    }

    #[test]
    fn test_interpreter_06_print_nil_prints_nothing() {
        assert_eq!(run("print nil; print 1;"), "1\n");
    }

    #[test]
    fn test_interpreter_07_escaped_newlines_are_expanded() {
        assert_eq!(run("print \"a\\nb\";"), "a\nb\n");
    }

    // ── variables and scope ─────────────────────────────────────────────

    #[test]
    fn test_interpreter_08_block_scoping() {
        let source = "
            int a = 1;
            {
                int a = 2;
                print a;
            }
            print a;
        ";

        assert_eq!(run(source), "2\n1\n");
    }

    #[test]
    fn test_interpreter_09_assignment_reaches_declaring_frame() {
        let source = "
            int x = 1;
            {
                {
                    x = 5;
                }
            }
            print x;
        ";

        assert_eq!(run(source), "5\n");
    }

    #[test]
    fn test_interpreter_10_compound_assignment() {
        assert_eq!(run("int n = 1; n += 2; n++; ++n; print n;"), "5\n");
        assert_eq!(run("string s = \"a\"; s += \"b\"; print s;"), "ab\n");
    }

    #[test]
    fn test_interpreter_11_uninitialised_variables_are_nil() {
        assert_eq!(run("int x; print x == nil;"), "true\n");
    }

    #[test]
    fn test_interpreter_12_undefined_names_read_as_nil() {
        assert_eq!(run("print missing == nil;"), "true\n");
    }

    // ── control flow ────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_13_for_loop() {
        assert_eq!(
            run("for (int i = 0; i < 3; i++) { print i; }"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn test_interpreter_14_while_loop() {
        assert_eq!(
            run("int i = 0; while (i < 3) { i += 1; } print i;"),
            "3\n"
        );
    }

    #[test]
    fn test_interpreter_15_else_if_chain() {
        let source = "
            int n = 15;
            if (n < 10) { print \"small\"; }
            else if (n < 20) { print \"medium\"; }
            else { print \"large\"; }
        ";

        assert_eq!(run(source), "medium\n");
    }

    // ── functions and blocks ────────────────────────────────────────────

    #[test]
    fn test_interpreter_16_functions_and_recursion() {
        let source = "
            int fib(int n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        ";

        assert_eq!(run(source), "55\n");
    }

    #[test]
    fn test_interpreter_17_function_closure_is_live() {
        let source = "
            int counter = 0;
            void bump() { counter = counter + 1; }
            bump();
            bump();
            print counter;
        ";

        assert_eq!(run(source), "2\n");
    }

    #[test]
    fn test_interpreter_18_missing_arguments_are_nil() {
        assert_eq!(
            run("void show(int a, int b) { print b == nil; } show(1);"),
            "true\n"
        );
    }

    #[test]
    fn test_interpreter_19_block_literals() {
        let source = "
            int (^add)(int, int) = ^int(int a, int b) { return a + b; };
            print add(2, 3);
        ";

        assert_eq!(run(source), "5\n");
    }

    #[test]
    fn test_interpreter_20_block_captures_a_snapshot() {
        let source = "
            int n = 1;
            void (^show)(void) = ^{ print n; };
            n = 2;
            show();
            print n;
        ";

        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn test_interpreter_21_blocks_returned_from_functions() {
        let source = "
            int (^(^makeAdder)(int))(int) = ^(int step) {
                return ^(int x) { return x + step; };
            };
            id addTen = makeAdder(10);
            print addTen(5);
        ";

        assert_eq!(run(source), "15\n");
    }

    // ── arrays ──────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_22_array_constructor_and_indexing() {
        let source = "
            id a = array(3);
            a[0] = 5;
            a[1] = a[0] + 1;
            a[1] += 1;
            print a[1];
            print a.count();
            print a[2] == nil;
            print a[10] == nil;
        ";

        assert_eq!(run(source), "7\n3\ntrue\ntrue\n");
    }

    #[test]
    fn test_interpreter_23_array_literal_and_pop() {
        let source = "
            id b = @[1, 2, 3];
            print b.pop();
            print b.count();
            print b[0] + b[1];
        ";

        assert_eq!(run(source), "3\n2\n3\n");
    }

    #[test]
    fn test_interpreter_24_string_indexing() {
        assert_eq!(run("string s = \"abc\"; print s[1];"), "b\n");
        assert_eq!(run("string s = \"abc\"; print s[5] == nil;"), "true\n");
    }

    // ── classes ─────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_25_properties_and_methods() {
        let source = "
            @interface Counter : NSObject
            @property int count;
            - (void)increment;
            @end

            @implementation Counter
            - (void)increment {
                count = count + 1;
            }
            @end

            Counter *c = [[Counter alloc] init];
            [c increment];
            [c increment];
            print c.count;
        ";

        assert_eq!(run(source), "2\n");
    }

    #[test]
    fn test_interpreter_26_instances_do_not_share_state() {
        let source = "
            @interface Box : NSObject
            @property int value;
            @end

            Box *a = [[Box alloc] init];
            Box *b = [[Box alloc] init];
            a.value = 3;
            print a.value;
            print b.value;
        ";

        assert_eq!(run(source), "3\n0\n");
    }

    #[test]
    fn test_interpreter_27_inheritance_and_super() {
        let source = "
            @interface Animal : NSObject
            @property int legs;
            - (int)describe;
            @end

            @implementation Animal
            - (int)describe {
                return legs;
            }
            @end

            @interface Dog : Animal
            - (int)describe;
            @end

            @implementation Dog
            - (int)describe {
                return [super describe] + 10;
            }
            @end

            Dog *d = [[Dog alloc] init];
            d.legs = 4;
            print [d describe];
        ";

        assert_eq!(run(source), "14\n");
    }

    #[test]
    fn test_interpreter_27_super_via_dot_call() {
        let source = "
            @interface A : NSObject
            - (string)m;
            @end
            @implementation A
            - (string)m { return \"A\"; }
            @end

            @interface B : A
            - (string)m;
            @end
            @implementation B
            - (string)m { return \"B\" + super.m(); }
            @end

            B *b = [[B alloc] init];
            print(b.m());
        ";

        assert_eq!(run(source), "BA\n");
    }

    #[test]
    fn test_interpreter_28_inherited_methods() {
        let source = "
            @interface Base : NSObject
            - (string)name;
            @end
            @implementation Base
            - (string)name { return \"base\"; }
            @end

            @interface Derived : Base
            @end

            Derived *d = [[Derived alloc] init];
            print [d name];
        ";

        assert_eq!(run(source), "base\n");
    }

    #[test]
    fn test_interpreter_29_custom_init_with_super_init() {
        let source = "
            @interface Point : NSObject
            @property int x;
            - (id)init;
            @end

            @implementation Point
            - (id)init {
                self = [super init];
                x = 7;
                return self;
            }
            @end

            Point *p = [[Point alloc] init];
            print p.x;
        ";

        assert_eq!(run(source), "7\n");
    }

    #[test]
    fn test_interpreter_30_static_methods() {
        let source = "
            @interface MathUtil : NSObject
            + (int)square:(int)x;
            @end

            @implementation MathUtil
            + (int)square:(int)x {
                return x * x;
            }
            @end

            print [MathUtil square: 5];
        ";

        assert_eq!(run(source), "25\n");
    }

    #[test]
    fn test_interpreter_31_multi_part_selectors() {
        let source = "
            @interface Calc : NSObject
            - (int)add:(int)a to:(int)b;
            @end

            @implementation Calc
            - (int)add:(int)a to:(int)b {
                return a + b;
            }
            @end

            Calc *calc = [[Calc alloc] init];
            print [calc add: 2 to: 3];
        ";

        assert_eq!(run(source), "5\n");
    }

    #[test]
    fn test_interpreter_32_property_defaults_and_initialisers() {
        let source = "
            @interface Config : NSObject
            @property int retries;
            @property NSString *label;
            @property int limit = 3;
            @end

            Config *c = [[Config alloc] init];
            print c.retries;
            print c.label == \"\";
            print c.limit;
        ";

        assert_eq!(run(source), "0\ntrue\n3\n");
    }

    #[test]
    fn test_interpreter_33_printing_objects() {
        let source = "
            @interface Thing : NSObject
            @end
            Thing *t = [[Thing alloc] init];
            print t;
            print Thing;
            print @[1];
        ";

        assert_eq!(run(source), "Thing instance\nThing\nArray instance\n");
    }

    // ── failures ────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_34_type_mismatch_appends_marker_once() {
        let output = run("print 1; print 1 - \"a\"; print 2;");

        assert_eq!(output, format!("1\n{}", ERROR_MARKER));
        assert_eq!(output.matches("ERROR").count(), 1);
    }

    #[test]
    fn test_interpreter_35_type_mismatch_is_recorded() {
        let interpreter = run_with(Interpreter::new(), "int x = nil * 2;");

        assert!(interpreter.output().ends_with(ERROR_MARKER));
        assert!(matches!(
            interpreter.last_error(),
            Some(ObjcError::TypeMismatch { operator, .. }) if operator == "*"
        ));
    }

    #[test]
    fn test_interpreter_36_calling_undefined_is_lenient() {
        let output = run("undefinedFunction(); int x = 3; x(); print \"after\";");

        assert_eq!(output, "after\n");
        assert!(!output.contains("ERROR"));
    }

    #[test]
    fn test_interpreter_37_top_level_return_fails() {
        assert_eq!(run("print 1; return 2; print 3;"), format!("1\n{}", ERROR_MARKER));
    }

    // ── built-ins ───────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_38_builtins_are_per_interpreter() {
        let first = run_with(Interpreter::new(), "int clock = 1;");
        let second = Interpreter::new();

        assert_eq!(first.global("clock"), Value::Number(1.0));
        assert!(matches!(second.global("clock"), Value::NativeFunction(_)));

        for name in ["clock", "array", "readLine", "printLine", "Int", "NSObject"] {
            assert!(second.is_builtin(name), "missing built-in {}", name);
        }
    }

    #[test]
    fn test_interpreter_39_int_and_clock() {
        assert_eq!(run("print Int(\"42\") + 1;"), "43\n");
        assert_eq!(run("print Int(\"abc\") == nil;"), "true\n");
        assert_eq!(run("print clock() > 0;"), "true\n");
    }

    #[test]
    fn test_interpreter_40_read_line_and_print_line() {
        let written = SharedBuffer::default();
        let interpreter = Interpreter::with_io(
            Box::new(Cursor::new(b"World\nsecond\n".to_vec())),
            Box::new(written.clone()),
        );

        let source = "
            string name = readLine();
            printLine(\"Hello, \" + name);
            printLine(readLine());
            print readLine() == nil;
        ";
        let interpreter = run_with(interpreter, source);

        let text = String::from_utf8(written.0.borrow().clone()).expect("utf-8 output");
        assert_eq!(text, "Hello, World\nsecond\n");

        // print goes to the buffer, not the writer
        assert_eq!(interpreter.output(), "true\n");
    }

    #[test]
    fn test_interpreter_41_take_output_drains() {
        let mut interpreter = run_with(Interpreter::new(), "print 1;");

        assert_eq!(interpreter.take_output(), "1\n");
        assert_eq!(interpreter.output(), "");
    }

    #[test]
    fn test_interpreter_42_calling_a_class_allocates() {
        let source = "
            @interface Point : NSObject
            @property int x;
            @end

            Point *p = Point();
            Point *q = Point();
            q.x = 5;
            print p.x;
            print q.x;
        ";

        assert_eq!(run(source), "0\n5\n");
    }

    #[test]
    fn test_interpreter_43_for_without_condition_skips_the_body() {
        let source = "
            int f() {
                for (int i = 0; ; i++) {
                    if (i == 2) return i;
                }
                return 99;
            }
            print f();

            int n = 0;
            for (n = 5; ;) { n = 100; }
            print n;
        ";

        assert_eq!(run(source), "99\n5\n");
    }

    #[test]
    fn test_interpreter_44_static_methods_through_an_instance() {
        let source = "
            int g = 1;

            @interface Ticker : NSObject
            + (void)bump;
            @end

            @implementation Ticker
            + (void)bump { g = g + 1; }
            @end

            Ticker *t = [[Ticker alloc] init];
            [Ticker bump];
            [t bump];
            print g;
        ";

        assert_eq!(run(source), "3\n");
    }

    #[test]
    fn test_interpreter_45_blocks_capture_loop_variables() {
        let source = "
            id a = array(3);
            for (int i = 0; i < 3; i++) {
                a[i] = ^{ print i; };
            }
            id first = a[0];
            first();
            id last = a[2];
            last();
        ";

        assert_eq!(run(source), "0\n2\n");
    }

    #[test]
    fn test_interpreter_46_blocks_capture_loop_variables_in_functions() {
        let source = "
            void collect() {
                id a = array(2);
                for (int i = 0; i < 2; i++) {
                    a[i] = ^{ return i * 10; };
                }
                id second = a[1];
                print second();
            }
            collect();
        ";

        assert_eq!(run(source), "10\n");
    }

    #[test]
    fn test_interpreter_47_super_inside_static_methods() {
        let source = "
            @interface Base : NSObject
            - (int)value;
            + (int)make;
            @end

            @interface Derived : Base
            + (int)make;
            @end

            @implementation Base
            - (int)value { return 1; }
            + (int)make { return 5; }
            @end

            @implementation Derived
            + (int)make {
                id missing = super.value;
                print missing == nil;
                return [super make] + 1;
            }
            @end

            print [Derived make];
        ";

        assert_eq!(run(source), "true\n6\n");
    }
}
