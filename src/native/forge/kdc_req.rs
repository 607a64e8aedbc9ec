use chrono::{DateTime, Duration, Utc};
use kerberos_asn1::{
    AsReq, Asn1Object, KdcReq, KerbPaPacRequest, KerberosTime, PaData,
    PrincipalName, TgsReq, Ticket,
};
use kerberos_constants::{kdc_options, pa_data_types, principal_names};
use kerberos_crypto::supported_etypes;
use rand;
use rand::Rng;

/// Lifetime requested when the caller sets none.
const DEFAULT_LIFETIME_HOURS: i64 = 24;

pub struct KdcReqBuilder {
    realm: String,
    sname: Option<PrincipalName>,
    etypes: Vec<i32>,
    kdc_options: u32,
    cname: Option<PrincipalName>,
    padatas: Vec<PaData>,
    nonce: u32,
    from: Option<KerberosTime>,
    till: KerberosTime,
    rtime: Option<KerberosTime>,
    additional_tickets: Vec<Ticket>,
}

impl KdcReqBuilder {
    /// Starts a request to the KDC of `realm` for its TGS.
    pub fn new(realm: String) -> Self {
        let till = Utc::now()
            .checked_add_signed(Duration::hours(DEFAULT_LIFETIME_HOURS))
            .unwrap_or_else(Utc::now);

        return Self {
            realm: realm.clone(),
            sname: Some(PrincipalName {
                name_type: principal_names::NT_SRV_INST,
                name_string: vec!["krbtgt".into(), realm],
            }),
            etypes: supported_etypes(),
            kdc_options: kdc_options::CANONICALIZE,
            cname: None,
            padatas: Vec::new(),
            nonce: rand::thread_rng().gen(),
            from: None,
            till: till.into(),
            rtime: None,
            additional_tickets: Vec::new(),
        };
    }

    pub fn add_kdc_option(mut self, kdc_option: u32) -> Self {
        self.kdc_options |= kdc_option;
        self
    }

    pub fn etypes(mut self, etypes: Vec<i32>) -> Self {
        self.etypes = etypes;
        self
    }

    pub fn cname(mut self, cname: Option<PrincipalName>) -> Self {
        self.cname = cname;
        self
    }

    pub fn sname(mut self, sname: Option<PrincipalName>) -> Self {
        self.sname = sname;
        self
    }

    /// Postdates the ticket.
    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from.into());
        self.add_kdc_option(kdc_options::ALLOW_POSTDATE | kdc_options::POSTDATED)
    }

    pub fn till(mut self, till: DateTime<Utc>) -> Self {
        self.till = till.into();
        self
    }

    /// Asks for a renewable ticket.
    pub fn rtime(mut self, rtime: DateTime<Utc>) -> Self {
        self.rtime = Some(rtime.into());
        self.add_kdc_option(kdc_options::RENEWABLE)
    }

    pub fn push_padata(mut self, padata: PaData) -> Self {
        self.padatas.push(padata);
        self
    }

    pub fn push_ticket(mut self, ticket: Ticket) -> Self {
        self.additional_tickets.push(ticket);
        self
    }

    pub fn request_pac(self) -> Self {
        self.push_padata(PaData::new(
            pa_data_types::PA_PAC_REQUEST,
            KerbPaPacRequest::new(true).build(),
        ))
    }

    pub fn nonce(&self) -> u32 {
        return self.nonce;
    }

    pub fn build(self) -> KdcReq {
        let mut req = KdcReq::default();

        req.req_body.kdc_options = self.kdc_options.into();
        req.req_body.cname = self.cname;
        req.req_body.realm = self.realm;
        req.req_body.sname = self.sname;
        req.req_body.from = self.from;
        req.req_body.till = self.till;
        req.req_body.rtime = self.rtime;
        req.req_body.nonce = self.nonce;
        req.req_body.etypes = self.etypes;

        if self.padatas.len() > 0 {
            req.padata = Some(self.padatas);
        }

        if self.additional_tickets.len() > 0 {
            req.req_body.additional_tickets = Some(self.additional_tickets);
        }

        return req;
    }

    pub fn build_as_req(self) -> AsReq {
        self.build().into()
    }

    pub fn build_tgs_req(self) -> TgsReq {
        self.build().into()
    }
}
