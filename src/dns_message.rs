use bytes::{Bytes, BytesMut};

use crate::dns_header::{DnsHeader, ResponseCode, HEADER_LEN};
use crate::dns_question_and_answer::{DnsAnswer, DnsQuestion};
use crate::error::WireError;
use crate::local::Resolve;

/// A header plus its question and answer sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsMessage {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsAnswer>,
}

impl DnsMessage {
    pub fn new(header: DnsHeader, questions: Vec<DnsQuestion>) -> Self {
        DnsMessage {
            header,
            questions,
            answers: Vec::new(),
        }
    }

    /// Parse a query: the header, then exactly `question_count` questions.
    /// Answer sections on the wire are ignored. The returned header's
    /// question count always matches the parsed questions.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, WireError> {
        let mut header = DnsHeader::from_bytes(buf)?;

        let mut questions = Vec::with_capacity(header.question_count as usize);
        let mut offset = HEADER_LEN;

        for _ in 0..header.question_count {
            let (question, consumed) = DnsQuestion::from_bytes(buf, offset)?;
            questions.push(question);
            offset += consumed;
        }

        header.question_count = questions.len() as u16;

        Ok(DnsMessage {
            header,
            questions,
            answers: Vec::new(),
        })
    }

    /// Header, then questions, then answers. Counts are written as they
    /// stand in the header; see [`DnsMessage::sync_counts`].
    pub fn to_bytes(&self) -> Result<Bytes, WireError> {
        let mut buf = BytesMut::with_capacity(512);

        buf.extend_from_slice(&self.header.to_bytes());
        for question in &self.questions {
            question.write_to(&mut buf)?;
        }
        for answer in &self.answers {
            answer.write_to(&mut buf)?;
        }

        Ok(buf.freeze())
    }

    /// Bring the section counts in the header back in line with the sections.
    pub fn sync_counts(&mut self) {
        self.header.question_count = self.questions.len() as u16;
        self.header.answer_count = self.answers.len() as u16;
    }

    /// Turn a parsed query into a response with one answer per question,
    /// in question order.
    pub fn process_questions(&mut self, resolver: &impl Resolve) {
        let answers: Vec<DnsAnswer> = self
            .questions
            .iter()
            .map(|question| resolver.resolve(question))
            .collect();
        self.answers.extend(answers);

        self.header.set_response(true);
        self.header.set_response_code(ResponseCode::NoError);
        self.sync_counts();

        // Only questions and answers are ever written. No EDNS support either;
        // a dangling additional count makes dig report a malformed packet.
        self.header.authority_count = 0;
        self.header.additional_count = 0;
    }

    /// Rewrite a parsed query as a SERVFAIL reply carrying its questions.
    pub fn into_server_failure(mut self) -> Self {
        self.header.set_response(true);
        self.header.set_response_code(ResponseCode::ServerFailure);
        self.sync_counts();
        self.header.authority_count = 0;
        self.header.additional_count = 0;
        self
    }
}
