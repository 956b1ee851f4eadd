#[cfg(test)]
mod scanner_tests {
    use objc_interpreter as objc;

    use objc::error::ObjcError;
    use objc::scanner::*;
    use objc::token::*;
    use pretty_assertions::assert_eq;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let tokens: Vec<Token> = scan_tokens(source).tokens;

        let actual: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.token_type.name(), t.lexeme.as_str()))
            .collect();
        let expected: Vec<(&str, &str)> = expected
            .iter()
            .map(|(tt, lexeme)| (tt.name(), *lexeme))
            .collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})[];:?-%^",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_SQUARE, "["),
                (TokenType::RIGHT_SQUARE, "]"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::COLON, ":"),
                (TokenType::QUESTION, "?"),
                (TokenType::MINUS, "-"),
                (TokenType::PERCENT, "%"),
                (TokenType::CARET, "^"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_character_operators() {
        assert_token_sequence(
            "!= == <= >= && || += ++ ! = < > & | /",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::AND, "&&"),
                (TokenType::OR, "||"),
                (TokenType::PLUS_EQUAL, "+="),
                (TokenType::PLUS_PLUS, "++"),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::AMPER, "&"),
                (TokenType::PIPE, "|"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "int float double BOOL void string id if else return while for print YES NO nil self super typedef counter _private",
            &[
                (TokenType::INT, "int"),
                (TokenType::FLOAT, "float"),
                (TokenType::DOUBLE, "double"),
                (TokenType::BOOL, "BOOL"),
                (TokenType::VOID, "void"),
                (TokenType::STRING_TYPE, "string"),
                (TokenType::ID, "id"),
                (TokenType::IF, "if"),
                (TokenType::ELSE, "else"),
                (TokenType::RETURN, "return"),
                (TokenType::WHILE, "while"),
                (TokenType::FOR, "for"),
                (TokenType::PRINT, "print"),
                (TokenType::YES, "YES"),
                (TokenType::NO, "NO"),
                (TokenType::NIL, "nil"),
                (TokenType::SELF, "self"),
                (TokenType::SUPER, "super"),
                (TokenType::TYPEDEF, "typedef"),
                (TokenType::IDENTIFIER, "counter"),
                (TokenType::IDENTIFIER, "_private"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_at_prefixed_forms() {
        assert_token_sequence(
            "@interface Shape @property @end @\"hello\" @[1, 2]",
            &[
                (TokenType::INTERFACE, "interface"),
                (TokenType::CLASS_IDENTIFIER, "Shape"),
                (TokenType::PROPERTY, "property"),
                (TokenType::END, "end"),
                (TokenType::STRING(String::new()), "hello"),
                (TokenType::ARRAY_START, "@["),
                (TokenType::NUMBER(0.0), "1"),
                (TokenType::COMMA, ","),
                (TokenType::NUMBER(0.0), "2"),
                (TokenType::RIGHT_SQUARE, "]"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_literal_payloads() {
        let tokens: Vec<Token> = scan_tokens("3.14 42 7. \"a\\nb\"").tokens;

        let payloads: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            payloads,
            vec![
                "NUMBER 3.14 3.14",
                "NUMBER 42 42.0",
                "NUMBER 7 7.0",
                "DOT . null",
                "STRING \"a\\nb\" a\\nb",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_scanner_06_comments_and_lines() {
        let tokens: Vec<Token> = scan_tokens("// line one\n/* two\n three */ value").tokens;

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "value");
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn test_scanner_07_directives_span_their_line() {
        let source = "#import <Foundation/Foundation.h>\n#define MAX 10\nint x;";

        assert_token_sequence(
            source,
            &[
                (TokenType::IMPORT, "#import <Foundation/Foundation.h>"),
                (TokenType::DEFINE, "#define MAX 10"),
                (TokenType::INT, "int"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_08_arc_qualifiers_are_dropped() {
        assert_token_sequence(
            "__block int total; __weak id other; __custom",
            &[
                (TokenType::INT, "int"),
                (TokenType::IDENTIFIER, "total"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::ID, "id"),
                (TokenType::IDENTIFIER, "other"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::IDENTIFIER, "custom"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_09_class_name_post_pass() {
        let source = "@implementation Widget @end x = (Gadget *)y; NSString *s; Widget *w;";
        let tokens: Vec<Token> = scan_tokens(source).tokens;

        let class_names: Vec<&str> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::CLASS_IDENTIFIER)
            .map(|t| t.lexeme.as_str())
            .collect();

        assert_eq!(class_names, vec!["Widget", "Gadget", "NSString", "Widget"]);

        // plain identifiers stay as they were
        assert!(tokens
            .iter()
            .any(|t| t.token_type == TokenType::IDENTIFIER && t.lexeme == "y"));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        match &results[2] {
            Err(ObjcError::Lex { message, line }) => {
                assert_eq!(message, "Unexpected character: $");
                assert_eq!(*line, 1);
            }
            other => panic!("Expected lex error, got {:?}", other),
        }

        fn assert_token_matches(
            result: &Result<Token, ObjcError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_unhandled_input_is_collected() {
        let scanned = scan_tokens("int a = 1; ` \"open");

        assert_eq!(scanned.unhandled.len(), 2);
        assert_eq!(
            scanned.unhandled[1].to_string(),
            "[line 1] Error: Unterminated string."
        );

        // scanning carried on past the bad input
        assert_eq!(scanned.tokens.len(), 6);
        assert_eq!(scanned.tokens[5].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_is_fused() {
        let mut scanner = Scanner::new(b"x");

        assert!(matches!(scanner.next(), Some(Ok(_))));
        assert!(matches!(scanner.next(), Some(Ok(ref t)) if t.token_type == TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_tokens_serialize_to_json() {
        let tokens: Vec<Token> = scan_tokens("(").tokens;
        let json: String = serde_json::to_string(&tokens[0]).expect("serializable");

        assert_eq!(json, r#"{"token_type":"LEFT_PAREN","lexeme":"(","line":1}"#);
    }
}
