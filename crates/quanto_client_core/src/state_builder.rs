//! Build the converter screen view from calculator, selection and rates.

use crate::calculator::{Calculator, HistoryEntry};
use crate::conversion::{convert_or_passthrough, format_currency, format_integer, rate_display};
use crate::models::ConverterView;
use crate::rates::RatesState;
use crate::selection::CurrencySelection;

pub fn build_converter_view(
    calculator: &Calculator,
    selection: &CurrencySelection,
    rates: &RatesState,
) -> ConverterView {
    let from = selection.source().code;
    let to = selection.target().code;
    let table = rates.table();

    let pending_expression = match (calculator.first_operand(), calculator.operator()) {
        (Some(left), Some(op)) => Some(format!("{} {}", format_integer(left), op)),
        _ => None,
    };
    let result = calculator
        .is_calculating()
        .then(|| format_integer(calculator.result()));

    let converted = convert_or_passthrough(calculator.result(), from, to, table.as_deref());

    ConverterView {
        source_currency: from.to_string(),
        target_currency: to.to_string(),
        history_lines: calculator.history().iter().map(history_line).collect(),
        pending_expression,
        amount: format_integer(calculator.current_value()),
        result,
        target_amount: format_currency(converted, to),
        rate_line: rate_display(table.as_deref(), from, to),
        rates_loading: rates.is_loading(),
        rates_error: rates.error().map(String::from),
        operators_enabled: calculator.operators_enabled(),
    }
}

fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "{} {} {} = {}",
        format_integer(entry.left),
        entry.operator,
        format_integer(entry.right),
        format_integer(entry.result)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{Key, Operator};
    use crate::models::ExchangeRatesResponse;
    use crate::storage;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::collections::HashMap;

    fn rates_with(pairs: &[(&str, f64)]) -> RatesState {
        let mut state = RatesState::default();
        state.apply_response(
            ExchangeRatesResponse {
                disclaimer: String::new(),
                license: String::new(),
                timestamp: 1_760_868_000,
                base: "USD".into(),
                rates: pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect::<HashMap<_, _>>(),
            },
            Utc::now(),
        );
        state
    }

    fn type_keys(calc: &mut Calculator, labels: &[&str]) {
        for label in labels {
            calc.press(Key::parse(label).expect("key"));
        }
    }

    #[test]
    #[serial]
    fn idle_view_without_rates_passes_amount_through() {
        storage::close();
        let mut calc = Calculator::new();
        type_keys(&mut calc, &["1", "2", "3", "4"]);
        let view = build_converter_view(&calc, &CurrencySelection::default(), &RatesState::default());
        assert_eq!(view.amount, "1,234");
        assert_eq!(view.target_amount, "¥1,234");
        assert_eq!(view.rate_line, None);
        assert_eq!(view.pending_expression, None);
        assert_eq!(view.result, None);
        assert!(view.history_lines.is_empty());
        assert!(view.operators_enabled);
    }

    #[test]
    #[serial]
    fn converts_with_rate_line() {
        storage::close();
        let mut calc = Calculator::new();
        type_keys(&mut calc, &["1", "0", "0"]);
        let rates = rates_with(&[("USD", 1.0), ("JPY", 150.456)]);
        let view = build_converter_view(&calc, &CurrencySelection::default(), &rates);
        assert_eq!(view.source_currency, "USD");
        assert_eq!(view.target_currency, "JPY");
        assert_eq!(view.target_amount, "¥15,046");
        assert_eq!(view.rate_line.as_deref(), Some("1 USD = 150.46 JPY"));
    }

    #[test]
    #[serial]
    fn chaining_shows_pending_and_live_result() {
        storage::close();
        let mut calc = Calculator::new();
        type_keys(&mut calc, &["1", "2", "0", "0", "×", "3"]);
        let view = build_converter_view(&calc, &CurrencySelection::default(), &RatesState::default());
        assert_eq!(view.pending_expression.as_deref(), Some("1,200 ×"));
        assert_eq!(view.amount, "3");
        assert_eq!(view.result.as_deref(), Some("3,600"));
        assert_eq!(view.target_amount, "¥3,600");
    }

    #[test]
    #[serial]
    fn history_lines_follow_equals() {
        storage::close();
        let mut calc = Calculator::new();
        calc.press_digit('5');
        calc.press_operator(Operator::Add);
        calc.press_digit('3');
        calc.press_equals();
        let view = build_converter_view(&calc, &CurrencySelection::default(), &RatesState::default());
        assert_eq!(view.history_lines, vec!["5 + 3 = 8".to_string()]);
        assert_eq!(view.amount, "8");
    }

    #[test]
    #[serial]
    fn missing_target_rate_falls_back_to_unconverted() {
        storage::close();
        let mut calc = Calculator::new();
        calc.press_digit('7');
        let mut selection = CurrencySelection::default();
        selection.set_target("EUR").unwrap();
        let rates = rates_with(&[("USD", 1.0)]);
        let view = build_converter_view(&calc, &selection, &rates);
        assert_eq!(view.target_amount, "€7");
        assert_eq!(view.rate_line, None);
    }
}
