//! This module provide functionalities to create/parse kerberos structs

mod kdc_req;
pub use kdc_req::KdcReqBuilder;

mod krb_cred;
pub use krb_cred::{new_krb_cred_info, new_ticket_cred};

mod pa_data;
pub use pa_data::{new_gss_ap_req, new_gss_checksum, GSS_CHECKSUM_TYPE};

mod build_req;
pub use build_req::{build_as_req, build_tgs_req, TicketTimes};

mod decrypters;
pub use decrypters::{
    extract_ticket_cred_from_as_rep, extract_ticket_cred_from_tgs_rep,
};
