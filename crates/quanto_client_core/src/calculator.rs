//! Keypad calculator: digit entry plus left-to-right operator chaining.
//!
//! Two states: idle (no pending operator) and chaining (an operand and an
//! operator are waiting for the right-hand side). Every operator press while
//! chaining folds the pending operation into history, so there is no
//! precedence: `5 + 3 × 2 =` is `(5 + 3) × 2`.

use crate::models::CalculatorSnapshot;
use crate::numeric::round_half_up;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_DIGITS: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "÷")]
    Divide,
    #[serde(rename = "×")]
    Multiply,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "−")]
    Subtract,
}

impl Operator {
    /// Keypad order.
    pub const ALL: [Operator; 4] = [
        Operator::Divide,
        Operator::Multiply,
        Operator::Add,
        Operator::Subtract,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Operator::Divide => "÷",
            Operator::Multiply => "×",
            Operator::Add => "+",
            Operator::Subtract => "−",
        }
    }

    pub fn from_glyph(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.glyph() == s)
    }

    /// Division by zero yields 0.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => {
                if b != 0.0 {
                    a / b
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// One completed step of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub left: f64,
    pub operator: Operator,
    pub right: f64,
    pub result: f64,
}

/// A keypad press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Clear,
    Backspace,
    Operator(Operator),
    Equals,
}

impl Key {
    /// Map a keypad label ("0"-"9", "C", "⌫", an operator glyph, "=").
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "C" => Some(Key::Clear),
            "⌫" => Some(Key::Backspace),
            "=" => Some(Key::Equals),
            _ => {
                if let Some(op) = Operator::from_glyph(label) {
                    return Some(Key::Operator(op));
                }
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(d), None) if d.is_ascii_digit() => Some(Key::Digit(d)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Calculator {
    input: String,
    // Operand and operator are set and cleared together.
    pending: Option<(f64, Operator)>,
    history: Vec<HistoryEntry>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            input: "0".to_string(),
            pending: None,
            history: Vec::new(),
        }
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn first_operand(&self) -> Option<f64> {
        self.pending.map(|(operand, _)| operand)
    }

    pub fn operator(&self) -> Option<Operator> {
        self.pending.map(|(_, op)| op)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_calculating(&self) -> bool {
        self.pending.is_some()
    }

    /// Operators stay muted until something meaningful has been entered.
    pub fn operators_enabled(&self) -> bool {
        self.input != "0" || self.pending.is_some()
    }

    /// Numeric value of the input; an unparsable input counts as 0.
    pub fn current_value(&self) -> f64 {
        self.input.parse().unwrap_or(0.0)
    }

    /// Live preview: the pending operation applied to the current value.
    pub fn result(&self) -> f64 {
        let current = self.current_value();
        match self.pending {
            Some((first, op)) => op.apply(first, current),
            None => current,
        }
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => self.press_digit(d),
            Key::Clear => self.press_clear(),
            Key::Backspace => self.press_backspace(),
            Key::Operator(op) => self.press_operator(op),
            Key::Equals => self.press_equals(),
        }
    }

    pub fn press_digit(&mut self, digit: char) {
        if !digit.is_ascii_digit() {
            return;
        }
        if self.input == "0" {
            self.input = digit.to_string();
        } else if self.input.len() < MAX_DIGITS {
            self.input.push(digit);
        }
    }

    pub fn press_clear(&mut self) {
        *self = Self::default();
    }

    pub fn press_backspace(&mut self) {
        if self.input.chars().count() <= 1 {
            self.input = "0".to_string();
        } else {
            self.input.pop();
        }
    }

    pub fn press_operator(&mut self, op: Operator) {
        if !self.operators_enabled() {
            return;
        }
        let current = self.current_value();
        match self.pending {
            Some((first, pending_op)) => {
                let folded = self.commit(first, pending_op, current);
                self.pending = Some((folded, op));
            }
            None => {
                self.history.clear();
                self.pending = Some((current, op));
            }
        }
        self.input = "0".to_string();
    }

    pub fn press_equals(&mut self) {
        let Some((first, op)) = self.pending.take() else {
            return;
        };
        let current = self.current_value();
        let result = self.commit(first, op, current);
        self.input = rounded_input(result);
    }

    pub fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            input: self.input.clone(),
            current_value: self.current_value(),
            first_operand: self.first_operand(),
            operator: self.operator(),
            history: self.history.clone(),
            is_calculating: self.is_calculating(),
            operators_enabled: self.operators_enabled(),
            result: self.result(),
        }
    }

    fn commit(&mut self, left: f64, operator: Operator, right: f64) -> f64 {
        let result = operator.apply(left, right);
        self.history.push(HistoryEntry {
            left,
            operator,
            right,
            result,
        });
        result
    }
}

fn rounded_input(value: f64) -> String {
    let rounded = round_half_up(value);
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{:.0}", rounded)
    }
}
