use crate::application::engine::LabelledSettlement;
use crate::domain::expense::GroupId;
use crate::domain::settlement::Balances;
use crate::domain::summary::GroupSummary;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// What a report lists, one row per item and group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Report {
    /// Transfers that settle each group.
    Settlements,
    /// Net balance of each member.
    Balances,
    /// Paid, share and net figures of each member.
    Summary,
    /// Spending per category.
    Categories,
}

impl Report {
    fn header(self) -> &'static [&'static str] {
        match self {
            Report::Settlements => &["group", "from", "to", "amount", "from_name", "to_name"],
            Report::Balances => &["group", "member", "balance"],
            Report::Summary => &["group", "member", "paid", "share", "net"],
            Report::Categories => &["group", "category", "total"],
        }
    }
}

#[derive(Serialize)]
struct SettlementRow<'a> {
    group: &'a str,
    from: &'a str,
    to: &'a str,
    amount: Decimal,
    from_name: &'a str,
    to_name: &'a str,
}

#[derive(Serialize)]
struct BalanceRow<'a> {
    group: &'a str,
    member: &'a str,
    balance: Decimal,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    group: &'a str,
    member: &'a str,
    paid: Decimal,
    share: Decimal,
    net: Decimal,
}

#[derive(Serialize)]
struct CategoryRow<'a> {
    group: &'a str,
    category: &'a str,
    total: Decimal,
}

/// Writes report rows as CSV.
///
/// The header is written up front so an empty report still names its columns.
/// Amounts are normalized, so `100.00` is written as `100`.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    report: Report,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W, report: Report) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        writer.write_record(report.header())?;
        Ok(Self { writer, report })
    }

    pub fn report(&self) -> Report {
        self.report
    }

    pub fn write_settlements(
        &mut self,
        group: &GroupId,
        settlements: &[LabelledSettlement],
    ) -> Result<()> {
        for settlement in settlements {
            self.writer.serialize(SettlementRow {
                group: group.as_str(),
                from: settlement.from.as_str(),
                to: settlement.to.as_str(),
                amount: settlement.amount.value().normalize(),
                from_name: &settlement.from_name,
                to_name: &settlement.to_name,
            })?;
        }
        Ok(())
    }

    pub fn write_balances(&mut self, group: &GroupId, balances: &Balances) -> Result<()> {
        for (member, balance) in balances {
            self.writer.serialize(BalanceRow {
                group: group.as_str(),
                member: member.as_str(),
                balance: balance.normalize().value(),
            })?;
        }
        Ok(())
    }

    pub fn write_summary(&mut self, group: &GroupId, summary: &GroupSummary) -> Result<()> {
        for (member, figures) in &summary.members {
            self.writer.serialize(SummaryRow {
                group: group.as_str(),
                member: member.as_str(),
                paid: figures.paid.normalize().value(),
                share: figures.share.normalize().value(),
                net: figures.net.normalize().value(),
            })?;
        }
        Ok(())
    }

    pub fn write_categories(&mut self, group: &GroupId, summary: &GroupSummary) -> Result<()> {
        for (category, total) in &summary.by_category {
            self.writer.serialize(CategoryRow {
                group: group.as_str(),
                category,
                total: total.normalize().value(),
            })?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
