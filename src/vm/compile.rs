//! Compiles a token stream into branch bytecode.
//!
//! `if`/`ifelse` are the only control flow a calculator program has, and
//! neither survives compilation: both are lowered here into
//! [`Instruction::JumpIfFalse`]/[`Instruction::Jump`] over a flat
//! instruction vector, so the executor never has to understand procedure
//! blocks at all.

use crate::error::VmError;
use crate::limits::Limits;
use crate::vm::token::Token;

/// A single compiled instruction.
///
/// Unlike a fixed-width bytecode record, this carries its payload in the
/// variant itself — there is exactly one producer (this module) and one
/// consumer (the executor), so there is nothing for a separate decode
/// step to buy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Push an integer literal.
    PushInt(i64),
    /// Push a real literal.
    PushReal(f64),
    /// Push `true`.
    PushTrue,
    /// Push `false`.
    PushFalse,

    Abs,
    Add,
    Atan,
    Ceiling,
    Cos,
    Cvi,
    Cvr,
    Div,
    Exp,
    Floor,
    Idiv,
    Ln,
    Log,
    Mod,
    Mul,
    Neg,
    Round,
    Sin,
    Sqrt,
    Sub,
    Truncate,

    And,
    Bitshift,
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Ne,
    Not,
    Or,
    Xor,

    Copy,
    Dup,
    Exch,
    Index,
    Pop,
    Roll,

    /// Branch `offset` instructions forward if the top of stack is false.
    /// The offset is relative to the instruction *following* this one.
    JumpIfFalse(i32),
    /// Branch `offset` instructions forward, unconditionally.
    Jump(i32),
}

fn simple_operator(name: &str) -> Option<Instruction> {
    use Instruction::*;
    Some(match name {
        "abs" => Abs,
        "add" => Add,
        "atan" => Atan,
        "ceiling" => Ceiling,
        "cos" => Cos,
        "cvi" => Cvi,
        "cvr" => Cvr,
        "div" => Div,
        "exp" => Exp,
        "floor" => Floor,
        "idiv" => Idiv,
        "ln" => Ln,
        "log" => Log,
        "mod" => Mod,
        "mul" => Mul,
        "neg" => Neg,
        "round" => Round,
        "sin" => Sin,
        "sqrt" => Sqrt,
        "sub" => Sub,
        "truncate" => Truncate,
        "and" => And,
        "bitshift" => Bitshift,
        "eq" => Eq,
        "ge" => Ge,
        "gt" => Gt,
        "le" => Le,
        "lt" => Lt,
        "ne" => Ne,
        "not" => Not,
        "or" => Or,
        "xor" => Xor,
        "copy" => Copy,
        "dup" => Dup,
        "exch" => Exch,
        "index" => Index,
        "pop" => Pop,
        "roll" => Roll,
        _ => return None,
    })
}

struct OpenBlock {
    body: Vec<Instruction>,
    /// `pending.len()` at the moment this block was opened; a `}` that
    /// closes it must find `pending` back at exactly this length, or some
    /// nested `{...}` inside it was never consumed by `if`/`ifelse`.
    pending_mark: usize,
}

/// Compile `tokens` (as produced by [`crate::vm::token::tokenize`]) into a
/// flat instruction stream.
pub fn compile(tokens: &[Token], limits: &Limits) -> Result<Vec<Instruction>, VmError> {
    let mut blocks: Vec<OpenBlock> = vec![OpenBlock { body: Vec::new(), pending_mark: 0 }];
    let mut pending: Vec<Vec<Instruction>> = Vec::new();
    let mut depth: u32 = 0;

    for tok in tokens {
        match tok {
            Token::LBrace => {
                depth += 1;
                if depth > limits.max_nesting_depth {
                    return Err(VmError::NestingTooDeep);
                }
                blocks.push(OpenBlock { body: Vec::new(), pending_mark: pending.len() });
            }
            Token::RBrace => {
                if depth == 0 {
                    return Err(VmError::UnbalancedBraces);
                }
                depth -= 1;
                let finished = blocks.pop().expect("depth > 0 implies a nested block is open");
                if pending.len() != finished.pending_mark {
                    return Err(VmError::UnusedProcedureBody);
                }
                pending.push(finished.body);
            }
            Token::Int(i) => current(&mut blocks).push(Instruction::PushInt(*i)),
            Token::Real(r) => current(&mut blocks).push(Instruction::PushReal(*r)),
            Token::Bool(true) => current(&mut blocks).push(Instruction::PushTrue),
            Token::Bool(false) => current(&mut blocks).push(Instruction::PushFalse),
            Token::Operator(name) if name == "if" => {
                let body = pending.pop().ok_or(VmError::UnusedProcedureBody)?;
                let block = current(&mut blocks);
                block.push(Instruction::JumpIfFalse(body.len() as i32));
                block.extend(body);
            }
            Token::Operator(name) if name == "ifelse" => {
                let false_body = pending.pop().ok_or(VmError::UnusedProcedureBody)?;
                let true_body = pending.pop().ok_or(VmError::UnusedProcedureBody)?;
                let block = current(&mut blocks);
                block.push(Instruction::JumpIfFalse(true_body.len() as i32 + 1));
                block.extend(true_body);
                block.push(Instruction::Jump(false_body.len() as i32));
                block.extend(false_body);
            }
            Token::Operator(name) => {
                let instr = simple_operator(name).ok_or_else(|| VmError::UnknownOperator(name.clone()))?;
                current(&mut blocks).push(instr);
            }
        }
    }

    if depth != 0 {
        return Err(VmError::UnbalancedBraces);
    }
    if !pending.is_empty() {
        return Err(VmError::UnusedProcedureBody);
    }
    Ok(blocks.pop().expect("top-level block always present").body)
}

fn current(blocks: &mut [OpenBlock]) -> &mut Vec<Instruction> {
    &mut blocks.last_mut().expect("top-level block always present").body
}
