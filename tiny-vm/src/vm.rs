use std::collections::HashMap;
use std::io::{BufRead, Write};

use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero};
use tiny_parser::ast::{ArithOp, Expr, Program, Stmt};
use tiny_passes::symtab::{Scope, SymbolType};
use tracing::{debug, trace};

use crate::error::RuntimeError;
use crate::value::Value;

/// Why a checked arithmetic operation produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithFault {
    Overflow,
    DivisionByZero,
}

/// Applies `op` to `lhs` and `rhs`, rejecting results that do not fit in `T`.
/// Division truncates toward zero.
fn checked_arith<T>(op: ArithOp, lhs: T, rhs: T) -> Result<T, ArithFault>
where
    T: CheckedAdd + CheckedSub + CheckedMul + CheckedDiv + Zero,
{
    let result = match op {
        ArithOp::Add => lhs.checked_add(&rhs),
        ArithOp::Sub => lhs.checked_sub(&rhs),
        ArithOp::Mul => lhs.checked_mul(&rhs),
        ArithOp::Div => {
            if rhs.is_zero() {
                return Err(ArithFault::DivisionByZero);
            }
            lhs.checked_div(&rhs)
        }
    };
    result.ok_or(ArithFault::Overflow)
}

/// Tree-walking interpreter over a checked [`Program`].
///
/// Reads `INPUT` lines from `R` and writes `PRINT` output to `W`.
pub struct Vm<'a, R, W> {
    program: &'a Program,
    scope: &'a Scope<'a>,
    /// Variable store, keyed by uppercase name.
    memory: HashMap<String, Value>,
    /// Index of the next line to execute. `None` once `END` has run.
    pc: Option<usize>,
    /// Return addresses pushed by `GOSUB`.
    call_stack: Vec<usize>,
    /// Number of the line being executed, `None` before the first step.
    current_line: Option<i16>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Vm<'a, R, W> {
    /// Creates a VM with every symbol of `scope` bound to the zero value of its type.
    pub fn new(program: &'a Program, scope: &'a Scope<'a>, input: R, output: W) -> Self {
        let memory = scope
            .symbols()
            .iter()
            .filter_map(|symbol| Value::initial(symbol.ty).map(|value| (symbol.name.clone(), value)))
            .collect();
        Self {
            program,
            scope,
            memory,
            pc: Some(0),
            call_stack: Vec::new(),
            current_line: None,
            input,
            output,
        }
    }

    /// Runs until `END` or the first runtime error.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        while let Some(pc) = self.pc {
            let line = program.lines.get(pc).ok_or(RuntimeError::PcOutOfRange {
                line: self.current_line,
            })?;
            trace!(pc, line = line.number, "step");
            self.current_line = Some(line.number);
            self.pc = Some(pc + 1);
            self.exec(&line.stmt)?;
        }
        self.output.flush()?;
        debug!("program terminated");
        Ok(())
    }

    /// Value of variable `ident`, if it has one.
    pub fn get(&self, ident: &str) -> Option<&Value> {
        self.memory.get(&ident.to_ascii_uppercase())
    }

    fn line(&self) -> i16 {
        self.current_line.unwrap_or_default()
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Declare { ty, idents } => {
                for ident in idents {
                    if let Some(value) = Value::initial((*ty).into()) {
                        self.memory.insert(ident.clone(), value);
                    }
                }
            }
            Stmt::Let { ident, value } => {
                let value = self.eval(value)?;
                self.memory.insert(ident.clone(), value);
            }
            Stmt::Input { ident } => {
                let value = match self.scope.type_of(ident) {
                    Some(SymbolType::String) => Value::Str(self.read_line()?),
                    // undeclared names are rejected by the symbol table builder
                    _ => Value::Integer(self.read_integer()?),
                };
                self.memory.insert(ident.clone(), value);
            }
            Stmt::Print { items } => {
                let mut text = String::new();
                for item in items {
                    text.push_str(&self.eval(item)?.to_string());
                }
                writeln!(self.output, "{}", text)?;
            }
            Stmt::If {
                lhs,
                relop,
                rhs,
                then,
            } => {
                let lhs = self.eval_integer(lhs)?;
                let rhs = self.eval_integer(rhs)?;
                if relop.compare(lhs, rhs) {
                    self.exec(then)?;
                }
            }
            Stmt::Goto { target } => {
                if let Some(index) = self.find_line(*target) {
                    self.pc = Some(index);
                }
            }
            Stmt::Gosub { target } => {
                if let Some(index) = self.find_line(*target) {
                    if let Some(next) = self.pc {
                        self.call_stack.push(next);
                    }
                    self.pc = Some(index);
                }
            }
            Stmt::Return => {
                let next = self
                    .call_stack
                    .pop()
                    .ok_or(RuntimeError::EmptyStack { line: self.line() })?;
                self.pc = Some(next);
            }
            Stmt::End => self.pc = None,
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::NumberLit(n) => Ok(Value::Integer(*n)),
            Expr::StringLit(s) => Ok(Value::Str(s.clone())),
            Expr::Identifier(ident) => {
                self.get(ident)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        line: self.line(),
                        ident: ident.clone(),
                    })
            }
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.eval_integer(lhs)?;
                let rhs = self.eval_integer(rhs)?;
                let line = self.line();
                checked_arith(*op, lhs, rhs)
                    .map(Value::Integer)
                    .map_err(|fault| match fault {
                        ArithFault::Overflow => RuntimeError::ArithmeticOverflow { line },
                        ArithFault::DivisionByZero => RuntimeError::DivisionByZero { line },
                    })
            }
        }
    }

    fn eval_integer(&self, expr: &Expr) -> Result<i16, RuntimeError> {
        self.eval(expr)?
            .cast_to_integer()
            .ok_or(RuntimeError::NonIntegerComparison { line: self.line() })
    }

    /// Index of the line numbered `number`.
    fn find_line(&self, number: i16) -> Option<usize> {
        self.program
            .lines
            .iter()
            .position(|line| line.number == number)
    }

    /// Reads lines until one parses as a 16-bit integer.
    fn read_integer(&mut self) -> Result<i16, RuntimeError> {
        loop {
            let line = self.read_line()?;
            match line.trim().parse::<i16>() {
                Ok(value) => return Ok(value),
                Err(err) => debug!(input = %line, %err, "rejected integer input"),
            }
        }
    }

    /// Reads one line without its line terminator. An empty line is a valid string.
    fn read_line(&mut self) -> Result<String, RuntimeError> {
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(RuntimeError::EndOfInput { line: self.line() });
        }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tiny_parser::parser::Parser;
    use tiny_passes::analyze::Analyzer;
    use tiny_passes::symtab::SymtabBuilder;
    use tiny_source::Source;

    fn check(source: &str) -> (Program, Scope<'static>) {
        let source = Source::new(source);
        let program = Parser::new(&source)
            .and_then(|mut parser| parser.parse_program())
            .unwrap();
        Analyzer::analyze(&program).unwrap();
        let scope = SymtabBuilder::new().build(&program).unwrap();
        (program, scope)
    }

    /// Runs `source` with `input` as stdin and returns the result along with everything printed.
    fn run(source: &str, input: &str) -> (Result<(), RuntimeError>, String) {
        let (program, scope) = check(source);
        let mut output = Vec::new();
        let result = Vm::new(&program, &scope, input.as_bytes(), &mut output).run();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_checked_arith() {
        assert_eq!(checked_arith(ArithOp::Add, 2i16, 3), Ok(5));
        assert_eq!(checked_arith(ArithOp::Div, 7i16, -2), Ok(-3));
        assert_eq!(
            checked_arith(ArithOp::Add, i16::MAX, 1),
            Err(ArithFault::Overflow)
        );
        assert_eq!(
            checked_arith(ArithOp::Div, i16::MIN, -1),
            Err(ArithFault::Overflow)
        );
        assert_eq!(
            checked_arith(ArithOp::Div, 1i16, 0),
            Err(ArithFault::DivisionByZero)
        );
    }

    #[test]
    fn test_hello_world() {
        let (result, output) = run("10 PRINT \"Hello, \", \"world\"\r\n20 END\r\n", "");
        assert!(result.is_ok());
        assert_eq!(output, "Hello, world\n");
    }

    #[test]
    fn test_print_expressions() {
        let (result, output) = run(
            "10 INTEGER A\r\n20 LET A = 6\r\n30 PRINT \"A*7=\", A * 7, \" \", -A / 4\r\n40 END\r\n",
            "",
        );
        assert!(result.is_ok());
        assert_eq!(output, "A*7=42 -1\n");
    }

    #[test]
    fn test_input_and_if() {
        let source = "10 INTEGER N\r\n\
                      20 INPUT N\r\n\
                      30 IF N > 10 THEN PRINT \"big\"\r\n\
                      40 IF N <= 10 THEN PRINT \"small\"\r\n\
                      50 END\r\n";
        assert_eq!(run(source, "42\n").1, "big\n");
        assert_eq!(run(source, "3\r\n").1, "small\n");
    }

    #[test]
    fn test_input_integer_retries() {
        let source = "10 INTEGER N\r\n20 INPUT N\r\n30 PRINT N\r\n40 END\r\n";
        let (result, output) = run(source, "abc\n99999\n  -17 \n");
        assert!(result.is_ok());
        assert_eq!(output, "-17\n");
    }

    #[test]
    fn test_input_string() {
        let source = "10 STRING S\r\n20 INPUT S\r\n30 PRINT \"[\", S, \"]\"\r\n40 END\r\n";
        assert_eq!(run(source, "hello there\r\n").1, "[hello there]\n");
        assert_eq!(run(source, "\n").1, "[]\n");
    }

    #[test]
    fn test_end_of_input() {
        let (result, _) = run("10 INTEGER N\r\n20 INPUT N\r\n30 END\r\n", "x\n");
        assert!(matches!(result, Err(RuntimeError::EndOfInput { line: 20 })));
    }

    #[test]
    fn test_gosub_return() {
        let source = "10 GOSUB 100\r\n\
                      20 PRINT \"back\"\r\n\
                      30 END\r\n\
                      100 PRINT \"in\"\r\n\
                      110 GOSUB 200\r\n\
                      120 RETURN\r\n\
                      200 PRINT \"deeper\"\r\n\
                      210 RETURN\r\n";
        let (result, output) = run(source, "");
        assert!(result.is_ok());
        assert_eq!(output, "in\ndeeper\nback\n");
    }

    #[test]
    fn test_goto_loop() {
        let source = "10 INTEGER I\r\n\
                      20 LET I = I + 1\r\n\
                      30 PRINT I\r\n\
                      40 IF I < 3 THEN GOTO 20\r\n\
                      50 END\r\n";
        assert_eq!(run(source, "").1, "1\n2\n3\n");
    }

    #[test]
    fn test_return_without_gosub() {
        let (result, _) = run("10 RETURN\r\n", "");
        assert!(matches!(result, Err(RuntimeError::EmptyStack { line: 10 })));
    }

    #[test]
    fn test_pc_out_of_range() {
        let (result, output) = run("10 PRINT 1\r\n20 PRINT 2\r\n", "");
        assert_eq!(output, "1\n2\n");
        let err = result.unwrap_err();
        assert!(matches!(err, RuntimeError::PcOutOfRange { line: Some(20) }));
        assert_eq!(err.to_string(), "[Line 20] PC out of range");

        let (result, _) = run("", "");
        assert!(matches!(result, Err(RuntimeError::PcOutOfRange { line: None })));
    }

    #[test]
    fn test_arithmetic_overflow() {
        let (result, _) = run("10 PRINT 32767 + 1\r\n20 END\r\n", "");
        assert!(matches!(
            result,
            Err(RuntimeError::ArithmeticOverflow { line: 10 })
        ));

        let (result, _) = run("10 PRINT 200 * 200\r\n20 END\r\n", "");
        assert!(matches!(
            result,
            Err(RuntimeError::ArithmeticOverflow { line: 10 })
        ));

        let (result, _) = run("10 PRINT (0 - 32767 - 1) / (-1)\r\n20 END\r\n", "");
        assert!(matches!(
            result,
            Err(RuntimeError::ArithmeticOverflow { line: 10 })
        ));
    }

    #[test]
    fn test_minimum_value() {
        let (result, output) = run("10 PRINT 0 - 32767 - 1\r\n20 END\r\n", "");
        assert!(result.is_ok());
        assert_eq!(output, "-32768\n");
    }

    #[test]
    fn test_division_by_zero() {
        let (result, output) = run("10 PRINT \"x\"\r\n20 PRINT 5 / 0\r\n30 END\r\n", "");
        assert_eq!(output, "x\n");
        let err = result.unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { line: 20 }));
        assert_eq!(err.to_string(), "[Line 20] Division by zero");
    }

    #[test]
    fn test_declare_resets() {
        let source = "10 INTEGER A\r\n\
                      20 LET A = A + 5\r\n\
                      30 PRINT A\r\n\
                      40 IF A < 10 THEN GOTO 20\r\n\
                      50 GOTO 70\r\n\
                      60 INTEGER B\r\n\
                      70 PRINT B\r\n\
                      80 END\r\n";
        assert_eq!(run(source, "").1, "5\n10\n0\n");
    }

    #[test]
    fn test_end_stops_immediately() {
        let (result, output) = run("10 IF 1 == 1 THEN END\r\n20 PRINT \"no\"\r\n", "");
        assert!(result.is_ok());
        assert_eq!(output, "");
    }

    #[test]
    fn test_string_comparison() {
        let (result, _) = run("10 STRING A, B\r\n20 IF A == B THEN END\r\n30 END\r\n", "");
        assert!(matches!(
            result,
            Err(RuntimeError::NonIntegerComparison { line: 20 })
        ));
    }

    #[test]
    fn test_string_assignment() {
        let source = "10 STRING A, B\r\n\
                      20 LET A = \"first\"\r\n\
                      30 LET B = A\r\n\
                      40 LET A = \"second\"\r\n\
                      50 PRINT A, \" \", B\r\n\
                      60 END\r\n";
        assert_eq!(run(source, "").1, "second first\n");
    }

    #[test]
    fn test_variables_are_case_insensitive() {
        let (program, scope) = check("10 INTEGER abc\r\n20 LET ABC = 4\r\n30 END\r\n");
        let mut output = Vec::new();
        let mut vm = Vm::new(&program, &scope, io::empty(), &mut output);
        vm.run().unwrap();
        assert_eq!(vm.get("Abc"), Some(&Value::Integer(4)));
    }
}
