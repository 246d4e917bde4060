use std::io::{self, Write};

use crate::table::{Aggregate, AggregationTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Whatever order the table iterates in.
    #[default]
    Unspecified,
    ByKey,
}

/// Writes `key: <average> : <min> <> <max>`, one key per line.
pub fn write_report<W: Write>(
    out: &mut W,
    table: &AggregationTable,
    order: Order,
) -> io::Result<()> {
    match order {
        Order::Unspecified => {
            for (key, aggregate) in table.iter() {
                write_line(out, key, aggregate)?;
            }
        }
        Order::ByKey => {
            for (key, aggregate) in table.sorted() {
                write_line(out, key, aggregate)?;
            }
        }
    }
    out.flush()
}

fn write_line<W: Write>(out: &mut W, key: &[u8], aggregate: &Aggregate) -> io::Result<()> {
    out.write_all(key)?;
    writeln!(
        out,
        ": {:.6} : {:.6} <> {:.6}",
        aggregate.mean(),
        aggregate.min_value(),
        aggregate.max_value()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sorted_lines() {
        let mut table = AggregationTable::new();
        table.fold(b"bb", -50);
        table.fold(b"aa", 123);
        table.fold(b"aa", 71);

        let mut out = Vec::new();
        write_report(&mut out, &table, Order::ByKey).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "aa: 9.700000 : 7.100000 <> 12.300000\nbb: -5.000000 : -5.000000 <> -5.000000\n"
        );
    }

    #[test]
    fn unspecified_order_has_every_key() {
        let table: AggregationTable = [(&b"x"[..], 1), (&b"y"[..], 2)].into_iter().collect();
        let mut out = Vec::new();
        write_report(&mut out, &table, Order::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("x: 0.100000 : 0.100000 <> 0.100000\n"));
    }
}
