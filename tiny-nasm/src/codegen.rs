//! Lowers a checked [`Program`] into NASM source for a 16-bit DOS `.COM` image.
//!
//! Expressions are evaluated on the hardware stack: every expression pushes exactly one word
//! (the value of an integer, the address of a string).

use std::convert::Infallible;

use tiny_parser::ast::{ArithOp, Expr, Line, Program, RelOp, Stmt};
use tiny_parser::visitor::{walk_expr, walk_line, Visitor};
use tiny_passes::symtab::{Scope, SymbolType};
use tracing::debug;

use crate::pool::StringPool;

/// Size in bytes of every `STRING` variable, terminator included.
pub const STRING_SIZE: usize = 32;
/// Scratch buffer used to read integer input.
pub const STRING_BUFFER: &str = "STRING_BUFFER";

const HEADER: &str = include_str!("runtime/header.asm");
const BUILTINS: &str = include_str!("runtime/builtins.asm");

/// Assembly label of the variable `name`.
///
/// The prefix keeps variables such as `AX` or `CX` from colliding with register names.
pub fn variable_label(name: &str) -> String {
    format!("Var_{}", name)
}

/// Generate assembly from an abstract syntax tree.
pub struct Codegen<'a> {
    scope: &'a Scope<'a>,
    /// Per-line code, without header or data.
    code: String,
    pool: StringPool,
    /// Number of division guards emitted so far. Names their local labels.
    division_count: usize,
}

impl<'a> Codegen<'a> {
    pub fn new(scope: &'a Scope<'a>) -> Self {
        Self {
            scope,
            code: String::new(),
            pool: StringPool::new(),
            division_count: 0,
        }
    }

    /// Consumes `self` and returns the complete assembly source for `program`.
    #[must_use]
    pub fn generate(mut self, program: &Program) -> String {
        if let Err(never) = self.visit_program(program) {
            match never {}
        }

        let mut asm = String::from(HEADER);
        asm.push_str(&self.code);
        asm.push_str("\n\tjmp PC_OUT_OF_RANGE\n\n");

        for symbol in self.scope.symbols() {
            let label = variable_label(&symbol.name);
            match symbol.ty {
                SymbolType::Integer => asm.push_str(&format!("{}: DW 0000h\n", label)),
                SymbolType::String => {
                    asm.push_str(&format!("{}: TIMES {} DB 00h\n", label, STRING_SIZE))
                }
                SymbolType::Void => {}
            }
        }
        asm.push('\n');

        asm.push_str(&self.pool.to_string());
        asm.push('\n');

        asm.push_str(&format!("{}: TIMES {} DB 00h\n", STRING_BUFFER, STRING_SIZE));
        asm.push_str(BUILTINS);

        debug!(
            lines = program.lines.len(),
            literals = self.pool.len(),
            bytes = asm.len(),
            "generated assembly"
        );
        asm
    }

    /// Appends one indented instruction.
    fn emit(&mut self, instr: impl AsRef<str>) {
        self.code.push('\t');
        self.code.push_str(instr.as_ref());
        self.code.push('\n');
    }

    fn emit_label(&mut self, label: impl AsRef<str>) {
        self.code.push_str(label.as_ref());
        self.code.push_str(":\n");
    }

    fn is_string(&self, ident: &str) -> bool {
        self.scope.type_of(ident) == Some(SymbolType::String)
    }

    /// Copies a whole `STRING` buffer from address `src` into variable `ident`.
    fn emit_string_copy(&mut self, src: &str, ident: &str) {
        self.emit(format!("mov si,{}", src));
        self.emit(format!("mov di,{}", variable_label(ident)));
        self.emit(format!("mov cx,{}", STRING_SIZE));
        self.emit("rep movsb");
    }

    fn emit_declaration(&mut self, ident: &str) {
        let label = variable_label(ident);
        if self.is_string(ident) {
            self.emit(format!("mov di,{}", label));
            self.emit(format!("mov cx,{}", STRING_SIZE));
            self.emit("xor al,al");
            self.emit("rep stosb");
        } else {
            self.emit(format!("mov [{}],word 0", label));
        }
    }

    fn emit_let(&mut self, ident: &str, value: &Expr) {
        let label = variable_label(ident);
        match value {
            Expr::NumberLit(n) => self.emit(format!("mov [{}],word {}", label, n)),
            Expr::StringLit(text) => {
                let src = self.pool.label(text);
                self.emit_string_copy(&src, ident);
            }
            Expr::Identifier(src) if self.is_string(ident) => {
                self.emit_string_copy(&variable_label(src), ident);
            }
            Expr::Identifier(src) => {
                self.emit(format!("mov ax,[{}]", variable_label(src)));
                self.emit(format!("mov [{}],ax", label));
            }
            Expr::Binary { .. } => {
                self.visit_expr_infallible(value);
                self.emit(format!("pop word [{}]", label));
            }
        }
    }

    fn emit_input(&mut self, ident: &str) {
        let label = variable_label(ident);
        if self.is_string(ident) {
            self.emit(format!("mov cx,{}", STRING_SIZE));
            self.emit(format!("mov dx,{}", label));
            self.emit("call READ_STRING");
            self.emit("call NEW_LINE");
        } else {
            // retried until the line parses as an integer
            self.emit_label(".read_number");
            self.emit(format!("mov cx,{}", STRING_SIZE));
            self.emit(format!("mov dx,{}", STRING_BUFFER));
            self.emit("call READ_STRING");
            self.emit("call NEW_LINE");
            self.emit(format!("mov cx,{}", label));
            self.emit(format!("mov dx,{}", STRING_BUFFER));
            self.emit("call STRING_TO_NUMBER");
            self.emit("cmp al,0");
            self.emit("je .read_number");
        }
    }

    fn emit_print(&mut self, items: &[Expr]) {
        for item in items {
            match item {
                Expr::NumberLit(n) => {
                    self.emit(format!("mov dx,{}", n));
                    self.emit("call PRINT_NUMBER");
                }
                Expr::StringLit(text) => {
                    let label = self.pool.label(text);
                    self.emit(format!("mov dx,{}", label));
                    self.emit("call PRINT_STRING");
                }
                Expr::Identifier(ident) if self.is_string(ident) => {
                    self.emit(format!("mov dx,{}", variable_label(ident)));
                    self.emit("call PRINT_STRING");
                }
                Expr::Identifier(ident) => {
                    self.emit(format!("mov dx,[{}]", variable_label(ident)));
                    self.emit("call PRINT_NUMBER");
                }
                Expr::Binary { .. } => {
                    self.visit_expr_infallible(item);
                    self.emit("pop dx");
                    self.emit("call PRINT_NUMBER");
                }
            }
        }
        self.emit("call NEW_LINE");
    }

    fn emit_arith(&mut self, op: ArithOp) {
        self.emit("pop bx");
        self.emit("pop ax");
        match op {
            ArithOp::Add => self.emit("add ax,bx"),
            ArithOp::Sub => self.emit("sub ax,bx"),
            ArithOp::Mul => self.emit("imul bx"),
            ArithOp::Div => {
                // idiv leaves OF undefined and faults on -32768 / -1, so both cases are tested first
                let checked = format!(".Div_{}", self.division_count);
                self.division_count += 1;
                self.emit("cwd");
                self.emit("cmp bx,00h");
                self.emit("je DIVISION_BY_ZERO");
                self.emit("cmp bx,-1");
                self.emit(format!("jne {}", checked));
                self.emit("cmp ax,8000h");
                self.emit("je ARITHMETIC_OVERFLOW");
                self.emit_label(&checked);
                self.emit("idiv bx");
                self.emit("push ax");
                return;
            }
        }
        self.emit("jo ARITHMETIC_OVERFLOW");
        self.emit("push ax");
    }

    fn visit_expr_infallible(&mut self, expr: &Expr) {
        if let Err(never) = self.visit_expr(expr) {
            match never {}
        }
    }
}

/// The jump taken when `relop` does not hold after `cmp ax,bx`.
fn inverted_jump(relop: RelOp) -> &'static str {
    match relop {
        RelOp::Less => "jnl",
        RelOp::LessEquals => "jnle",
        RelOp::Greater => "jng",
        RelOp::GreaterEquals => "jnge",
        RelOp::Equals => "jne",
        RelOp::NotEquals => "je",
    }
}

impl<'ast> Visitor<'ast> for Codegen<'_> {
    type Error = Infallible;

    fn visit_line(&mut self, line: &'ast Line) -> Result<(), Self::Error> {
        self.code.push('\n');
        self.emit_label(format!("Line_{}", line.number));
        walk_line(self, line)?;
        self.emit_label(".Line_end");
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) -> Result<(), Self::Error> {
        match stmt {
            Stmt::Declare { ty: _, idents } => {
                for ident in idents {
                    self.emit_declaration(ident);
                }
            }
            Stmt::Let { ident, value } => self.emit_let(ident, value),
            Stmt::Input { ident } => self.emit_input(ident),
            Stmt::Print { items } => self.emit_print(items),
            Stmt::If {
                lhs,
                relop,
                rhs,
                then,
            } => {
                self.visit_expr(lhs)?;
                self.visit_expr(rhs)?;
                self.emit("pop bx");
                self.emit("pop ax");
                self.emit("cmp ax,bx");
                self.emit(format!("{} .Line_end", inverted_jump(*relop)));
                self.visit_stmt(then)?;
            }
            Stmt::Goto { target } => self.emit(format!("jmp Line_{}", target)),
            Stmt::Gosub { target } => self.emit(format!("call Line_{}", target)),
            Stmt::Return => self.emit("ret"),
            Stmt::End => self.emit("call TERMINATE_PROGRAM"),
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &'ast Expr) -> Result<(), Self::Error> {
        walk_expr(self, expr)?;

        match expr {
            Expr::NumberLit(n) => self.emit(format!("mov ax,{}", n)),
            Expr::StringLit(text) => {
                let label = self.pool.label(text);
                self.emit(format!("mov ax,{}", label));
            }
            Expr::Identifier(ident) if self.is_string(ident) => {
                self.emit(format!("mov ax,{}", variable_label(ident)))
            }
            Expr::Identifier(ident) => self.emit(format!("mov ax,[{}]", variable_label(ident))),
            Expr::Binary { lhs: _, op, rhs: _ } => {
                // operands were pushed by walk_expr
                self.emit_arith(*op);
                return Ok(());
            }
        }
        self.emit("push ax");
        Ok(())
    }
}
