use crate::domain::member::{Member, MemberId};
use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct MemberRecord {
    member: MemberId,
    name: String,
}

/// Reads `member, name` rows used to label settlements.
pub struct MemberReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> MemberReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn members(self) -> impl Iterator<Item = Result<Member>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map(|record: MemberRecord| Member::new(record.member, record.name))
                .map_err(EngineError::from)
        })
    }
}
