#![allow(dead_code)]
use ferrous_fanmerge_application::DnsRequest;
use ferrous_fanmerge_infrastructure::dns::forwarding::MessageBuilder;
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Builder para registros de resposta usados nos testes
pub struct RecordBuilder;

impl RecordBuilder {
    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    pub fn a(owner: &str, ip: Ipv4Addr) -> Record {
        Record::from_rdata(Self::name(owner), 300, RData::A(A::from(ip)))
    }

    pub fn aaaa(owner: &str, ip: Ipv6Addr) -> Record {
        Record::from_rdata(Self::name(owner), 300, RData::AAAA(AAAA::from(ip)))
    }

    pub fn mx(owner: &str, preference: u16, exchange: &str) -> Record {
        Record::from_rdata(
            Self::name(owner),
            300,
            RData::MX(MX::new(preference, Self::name(exchange))),
        )
    }

    pub fn cname(owner: &str, target: &str) -> Record {
        Record::from_rdata(
            Self::name(owner),
            300,
            RData::CNAME(CNAME(Self::name(target))),
        )
    }

    pub fn txt(owner: &str, text: &str) -> Record {
        Record::from_rdata(
            Self::name(owner),
            300,
            RData::TXT(TXT::new(vec![text.to_string()])),
        )
    }
}

/// Builder para requisições DNS de teste
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn query(domain: &str, record_type: RecordType) -> DnsRequest {
        DnsRequest::new(MessageBuilder::build_query(domain, record_type).unwrap())
    }

    pub fn a(domain: &str) -> DnsRequest {
        Self::query(domain, RecordType::A)
    }
}
