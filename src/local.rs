use crate::dns_question_and_answer::{DnsAnswer, DnsQuestion};

/// TTL in seconds attached to every synthesized answer.
pub const SYNTHETIC_TTL: u32 = 60;

/// Payload carried by every synthesized answer.
pub const SYNTHETIC_DATA: [u8; 4] = [8, 8, 8, 8];

/// Produces the single answer for one question.
pub trait Resolve {
    fn resolve(&self, question: &DnsQuestion) -> DnsAnswer;
}

/// Answers every question with the same fixed record, echoing the
/// question's name, type and class.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticResolver;

impl Resolve for SyntheticResolver {
    fn resolve(&self, question: &DnsQuestion) -> DnsAnswer {
        DnsAnswer::new(
            question.name.clone(),
            question.qtype,
            question.qclass,
            SYNTHETIC_TTL,
            SYNTHETIC_DATA.to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_answer_echoes_question() {
        let question = DnsQuestion::new("mail.example.org", 15, 3);
        let answer = SyntheticResolver.resolve(&question);

        assert_eq!(answer.name, "mail.example.org");
        assert_eq!(answer.rtype, 15);
        assert_eq!(answer.rclass, 3);
        assert_eq!(answer.ttl, 60);
        assert_eq!(answer.rdlength, 4);
        assert_eq!(answer.rdata, vec![8, 8, 8, 8]);
    }
}
