use std::f64::consts::PI;

use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::Rect;
use thiserror::Error;

use super::{App, AppContext, RenderContext};
use crate::components::{ButtonBar, Component, ComponentContext, ListComponent};
use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected '{0}'")]
    Unexpected(char),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
}

/// Evaluate an arithmetic expression.
///
/// Supports `+ - * /`, right-associative `^`, parentheses, unary signs,
/// `π`/`pi`, `√x` and the functions `sin cos tan sqrt log` (base 10) and
/// `ln`.
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    let mut parser = Parser {
        chars: input.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
    };
    let value = parser.expr()?;
    if let Some(&c) = parser.chars.get(parser.pos) {
        return Err(CalcError::Unexpected(c));
    }
    if !value.is_finite() {
        return Err(CalcError::NotFinite);
    }
    Ok(value)
}

/// Integral results print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), CalcError> {
        match self.peek() {
            Some(found) if found == c => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(CalcError::Unexpected(found)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') || self.eat('×') {
                value *= self.unary()?;
            } else if self.eat('/') || self.eat('÷') {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value /= rhs;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.eat('^') {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        let Some(c) = self.peek() else {
            return Err(CalcError::UnexpectedEnd);
        };
        match c {
            '(' => {
                self.pos += 1;
                let value = self.expr()?;
                self.expect(')')?;
                Ok(value)
            }
            'π' => {
                self.pos += 1;
                Ok(PI)
            }
            '√' => {
                self.pos += 1;
                Ok(self.power()?.sqrt())
            }
            c if c.is_ascii_digit() || c == '.' => self.number(),
            c if c.is_alphabetic() => self.call(),
            other => Err(CalcError::Unexpected(other)),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|_| CalcError::Unexpected(self.chars[start]))
    }

    fn call(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while self.peek().is_some_and(char::is_alphabetic) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if name == "pi" {
            return Ok(PI);
        }
        let f: fn(f64) -> f64 = match name.as_str() {
            "sin" => f64::sin,
            "cos" => f64::cos,
            "tan" => f64::tan,
            "sqrt" => f64::sqrt,
            "log" => f64::log10,
            "ln" => f64::ln,
            _ => return Err(CalcError::UnknownFunction(name)),
        };
        self.expect('(')?;
        let arg = self.expr()?;
        self.expect(')')?;
        Ok(f(arg))
    }
}

const KEYPAD: [[&str; 4]; 4] = [
    ["7", "8", "9", "/"],
    ["4", "5", "6", "*"],
    ["1", "2", "3", "-"],
    ["0", ".", "=", "+"],
];

/// Shortcut buttons: label and the expression they evaluate.
const SCIENTIFIC: [(&str, &str); 8] = [
    ("sin(π/2)", "sin(π/2)"),
    ("cos(0)", "cos(0)"),
    ("tan(π/4)", "tan(π/4)"),
    ("log(10)", "log(10)"),
    ("ln(1)", "ln(1)"),
    ("√(16)", "√(16)"),
    ("π", "π"),
    ("Clear", ""),
];

pub struct CalculatorApp {
    expression: String,
    display: String,
    history: ListComponent,
    keypad: Vec<ButtonBar>,
    scientific: Vec<ButtonBar>,
}

impl Default for CalculatorApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorApp {
    pub fn new() -> Self {
        Self {
            expression: String::new(),
            display: String::new(),
            history: ListComponent::new("History"),
            keypad: KEYPAD.iter().map(|row| ButtonBar::new(*row)).collect(),
            scientific: SCIENTIFIC
                .chunks(4)
                .map(|chunk| ButtonBar::new(chunk.iter().map(|(label, _)| *label)))
                .collect(),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn history(&self) -> &[String] {
        self.history.items()
    }

    fn append(&mut self, text: &str) {
        self.expression.push_str(text);
        self.display = self.expression.clone();
    }

    fn clear(&mut self) {
        self.expression.clear();
        self.display.clear();
    }

    fn calculate(&mut self) {
        match evaluate(&self.expression) {
            Ok(value) => {
                let result = format_number(value);
                let mut history = self.history.items().to_vec();
                history.push(format!("{} = {}", self.expression, result));
                let last = history.len() - 1;
                self.history.set_items(history);
                self.history.set_selected(last);
                self.display = result.clone();
                self.expression = result;
            }
            Err(err) => {
                tracing::debug!(expression = %self.expression, %err, "calculation failed");
                self.display = "Error".to_string();
                self.expression.clear();
            }
        }
    }

    fn scientific(&mut self, index: usize) {
        let Some((label, expr)) = SCIENTIFIC.get(index) else {
            return;
        };
        match *label {
            "Clear" => self.clear(),
            "π" => self.append("π"),
            _ => match evaluate(expr) {
                Ok(value) => {
                    self.expression = format_number(value);
                    self.display = self.expression.clone();
                }
                Err(_) => {
                    self.display = "Error".to_string();
                    self.expression.clear();
                }
            },
        }
    }

    fn keypad(&mut self, label: &str) {
        if label == "=" {
            self.calculate();
        } else {
            self.append(label);
        }
    }
}

impl App for CalculatorApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.width < 10 || area.height < 4 {
            return;
        }
        let display_rect = Rect::new(area.x + 1, area.y, area.width - 2, 1);
        frame.fill(display_rect, palette.entry(ctx.focused));
        let width = display_rect.width as usize;
        let shown = self.display.chars().count();
        let x = display_rect.x + width.saturating_sub(shown) as u16;
        frame.set_string(x, display_rect.y, &self.display, palette.entry(ctx.focused));

        let mut y = area.y + 2;
        for row in self.keypad.iter_mut() {
            if y >= area.bottom() {
                break;
            }
            row.render(frame, Rect::new(area.x + 1, y, area.width - 2, 1), &ctx.component(false));
            y += 1;
        }
        y += 1;
        for row in self.scientific.iter_mut() {
            if y >= area.bottom() {
                break;
            }
            row.render(frame, Rect::new(area.x + 1, y, area.width - 2, 1), &ctx.component(false));
            y += 1;
        }
        if y + 3 <= area.bottom() {
            let rect = Rect::new(area.x + 1, y, area.width - 2, area.bottom() - y);
            self.history.render(frame, rect, &ctx.component(false));
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &mut AppContext<'_>) -> bool {
        let pressed = |bars: &[ButtonBar]| {
            bars.iter()
                .enumerate()
                .find_map(|(row, bar)| bar.clicked(event).map(|i| (row, i)))
        };
        if let Some((row, i)) = pressed(&self.keypad) {
            self.keypad(KEYPAD[row][i]);
            return true;
        }
        if let Some((row, i)) = pressed(&self.scientific) {
            self.scientific(row * 4 + i);
            return true;
        }
        match event {
            Event::Key(key)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                match key.code {
                    KeyCode::Enter | KeyCode::Char('=') => self.calculate(),
                    KeyCode::Esc | KeyCode::Delete => self.clear(),
                    KeyCode::Backspace => {
                        self.expression.pop();
                        self.display = self.expression.clone();
                    }
                    KeyCode::Char(c) if c.is_ascii_alphanumeric() || "+-*/^().π√".contains(c) => {
                        self.append(&c.to_string());
                    }
                    KeyCode::Up | KeyCode::Down => {
                        return self.history.handle_event(event, &ComponentContext::default());
                    }
                    _ => return false,
                }
                true
            }
            Event::Mouse(_) => self.history.handle_event(event, &ComponentContext::default()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{Harness, find};

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate("2^3^2").unwrap(), 512.0);
        assert_eq!(evaluate("-2^2").unwrap(), -4.0);
        assert_eq!(evaluate("7/2").unwrap(), 3.5);
    }

    #[test]
    fn functions_and_constants() {
        assert_eq!(evaluate("sin(π/2)").unwrap(), 1.0);
        assert_eq!(evaluate("cos(0)").unwrap(), 1.0);
        assert_eq!(evaluate("log(10)").unwrap(), 1.0);
        assert_eq!(evaluate("ln(1)").unwrap(), 0.0);
        assert_eq!(evaluate("√(16)").unwrap(), 4.0);
        assert_eq!(evaluate("sqrt(9)").unwrap(), 3.0);
        assert_eq!(evaluate("pi").unwrap(), PI);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert_eq!(evaluate("1/0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("2+"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("2)"), Err(CalcError::Unexpected(')')));
        assert!(matches!(evaluate("foo(1)"), Err(CalcError::UnknownFunction(_))));
        assert_eq!(evaluate("(-1)^0.5"), Err(CalcError::NotFinite));
    }

    #[test]
    fn formatting() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn typed_expression_goes_to_history() {
        let mut h = Harness::new();
        let mut app = CalculatorApp::new();
        h.type_str(&mut app, "12*3");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(app.display(), "36");
        assert_eq!(app.history(), ["12*3 = 36"]);
        // the result seeds the next expression
        h.type_str(&mut app, "+4=");
        assert_eq!(app.display(), "40");

        h.type_str(&mut app, "/(");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(app.display(), "Error");
        assert_eq!(app.history().len(), 2);
    }

    #[test]
    fn keypad_and_scientific_buttons() {
        let mut h = Harness::new();
        let mut app = CalculatorApp::new();
        let buffer = h.render(&mut app, 50, 20);
        let (x, y) = find(&buffer, "[ 9 ]").unwrap();
        h.click(&mut app, x, y);
        let (x, y) = find(&buffer, "[ + ]").unwrap();
        h.click(&mut app, x, y);
        let (x, y) = find(&buffer, "[ √(16) ]").unwrap();
        h.click(&mut app, x, y);
        assert_eq!(app.display(), "4");
        let (x, y) = find(&buffer, "[ Clear ]").unwrap();
        h.click(&mut app, x, y);
        assert_eq!(app.display(), "");
    }
}
