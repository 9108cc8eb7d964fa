use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 8] = [
    "type",
    "expense",
    "group",
    "member",
    "amount",
    "category",
    "timestamp",
    "counterparty",
];

const MEMBERS: [&str; 4] = ["ana", "bea", "cal", "dev"];

/// Writes `expenses` expenses into one group, each paid by a rotating member
/// and split equally between all four members.
pub fn generate_csv(path: &Path, expenses: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    for i in 1..=expenses {
        write_expense(&mut wtr, &format!("e{i}"), "trip", MEMBERS[i % MEMBERS.len()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes roughly `size_mb` megabytes of expenses spread over 50 groups.
pub fn generate_large_csv(path: &Path, size_mb: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    let target_size = (size_mb * 1024 * 1024) as u64;
    let mut expense_id = 1;

    // Check size every 1000 expenses to avoid syscall overhead
    loop {
        for _ in 0..1000 {
            let group = format!("group-{}", expense_id % 50 + 1);
            let payer = MEMBERS[expense_id % MEMBERS.len()];
            write_expense(&mut wtr, &format!("e{expense_id}"), &group, payer)?;
            expense_id += 1;
        }
        wtr.flush()?;
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}

fn write_expense(
    wtr: &mut csv::Writer<File>,
    id: &str,
    group: &str,
    payer: &str,
) -> Result<(), Error> {
    wtr.write_record(["expense", id, group, payer, "4.00", "Food", "", ""])?;
    for member in MEMBERS {
        wtr.write_record(["split", id, "", member, "1.00", "", "", ""])?;
    }
    Ok(())
}
