use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppConfidentialityError, AppErrorCode};

const SOURCE_SIZE_LIMIT_NBYTES: u64 = 8196;

pub struct UserSpaceConfidentiality {
    _src_fullpath: String,
    // only few modules read secrets (processor token, webhook key, bot token),
    // the inner cache is expected to be small
    _cached: RwLock<HashMap<String, String>>,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        Self {
            _cached: RwLock::new(HashMap::new()),
            _src_fullpath: fullpath,
        }
    }

    fn load_source(&self) -> DefaultResult<JsnVal, AppConfidentialityError> {
        let srcpath = self._src_fullpath.as_str();
        let io_err = |e: std::io::Error| AppConfidentialityError {
            detail: e.to_string(),
            code: AppErrorCode::IOerror(e.kind()),
        };
        let mut file = File::open(srcpath).map_err(io_err)?;
        let actual_f_sz = file.metadata().map_err(io_err)?.len();
        if actual_f_sz >= SOURCE_SIZE_LIMIT_NBYTES {
            return Err(AppConfidentialityError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: format!("source-file-size:{actual_f_sz}"),
            });
        }
        let mut rawbuf = Vec::new();
        let _sz = file.read_to_end(&mut rawbuf).map_err(io_err)?;
        serde_json::from_slice::<JsnVal>(&rawbuf).map_err(|e| AppConfidentialityError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: e.to_string(),
        })
    }

    fn search_json_payload<'a>(
        toplvl: &'a JsnVal,
        id_: &str,
    ) -> DefaultResult<&'a JsnVal, AppConfidentialityError> {
        id_.split('/').try_fold(toplvl, |curr_lvl, tok| {
            let found = match curr_lvl {
                JsnVal::Object(o) => o.get(tok).ok_or("json-object"),
                JsnVal::Array(a) => tok
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| a.get(idx))
                    .ok_or("json-array"),
                _others => Err("json-scalar"),
            };
            found.map_err(|label| AppConfidentialityError {
                detail: format!("{label},id:{id_},token:{tok}"),
                code: AppErrorCode::NoConfidentialityCfg,
            })
        })
    }

    fn lock_error(e: impl ToString) -> AppConfidentialityError {
        AppConfidentialityError {
            detail: e.to_string() + ", source: UserSpaceConfidentiality",
            code: AppErrorCode::AcquireLockFailure,
        }
    }
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError> {
        {
            let rguard = self._cached.read().map_err(Self::lock_error)?;
            if let Some(v) = rguard.get(id_) {
                return Ok(v.clone());
            }
        }
        let toplvl = self.load_source()?;
        let found = Self::search_json_payload(&toplvl, id_)?.to_string();
        let mut wguard = self._cached.write().map_err(Self::lock_error)?;
        let _old = wguard.insert(id_.to_string(), found.clone());
        Ok(found)
    }
}
