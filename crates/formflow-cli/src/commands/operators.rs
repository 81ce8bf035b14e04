//! Operators command implementation.

use formflow_core::{FieldType, Operator};

/// Runs the operators command.
pub fn run() {
    println!("Conditional operators:\n");
    println!("{:<15} Description", "Operator");
    println!("{}", "-".repeat(72));

    for op in Operator::KNOWN {
        println!("{:<15} {}", op.as_str(), describe(&op));
    }

    println!("\nUnrecognised operators follow [rules] unknown_operator (default: fail-open).");

    println!("\nField types:\n");
    for field_type in FieldType::ALL {
        let zero = field_type.zero_value();
        let zero = serde_json::to_string(&zero).unwrap_or_default();
        println!("  {:<15} empty value {}", field_type.as_str(), zero);
    }
}

fn describe(op: &Operator) -> &'static str {
    match op {
        Operator::Equals => "value is strictly equal to the operand",
        Operator::NotEquals => "value is not strictly equal to the operand",
        Operator::Contains => "list holds the operand, or text contains it",
        Operator::GreaterThan => "value is numerically greater than the operand",
        Operator::LessThan => "value is numerically less than the operand",
        Operator::IsEmpty => "value is falsy, an empty list or blank text",
        Operator::IsNotEmpty => "value is truthy, a non-empty list and non-blank text",
        Operator::Other(_) => "unrecognised",
    }
}
