use crate::error::ShmError;
use nix::fcntl::OFlag;
use nix::mqueue::{mq_open, mq_receive, mq_send, MQ_OFlag, MqAttr, MqdT};
use nix::sys::stat::Mode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::CString;
use std::marker::PhantomData;

/// Maximum encoded message size. Generous for the fixed, small structs
/// (`TimesliceWorkItem`, `TimesliceCompletion`) this queue actually
/// carries.
const MAX_MSG_SIZE: usize = 256;

/// A named, bounded POSIX message queue carrying bincode-encoded values
/// of type `T`, bridging the compute buffer and its processor child
/// processes.
///
/// An empty (zero-length) message is the shutdown sentinel: `recv`
/// returns `Ok(None)` for it instead of trying to decode a `T`.
pub struct MessageQueue<T> {
    mqd: MqdT,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> MessageQueue<T> {
    /// Creates a new queue of the given `name` and `depth` (its maximum
    /// backlog, `2^desc_bits` per the spec).
    pub fn create(name: &str, depth: i64) -> Result<Self, ShmError> {
        let name = CString::new(name).expect("queue name has no interior NUL");
        let attr = MqAttr::new(0, depth, MAX_MSG_SIZE as i64, 0);
        let mqd = mq_open(
            name.as_c_str(),
            MQ_OFlag::O_CREAT | MQ_OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
            Some(&attr),
        )?;
        Ok(Self {
            mqd,
            _marker: PhantomData,
        })
    }

    /// Opens an already-created queue (used by a processor child process
    /// given the queue name as an argument).
    pub fn open(name: &str) -> Result<Self, ShmError> {
        let name = CString::new(name).expect("queue name has no interior NUL");
        let mqd = mq_open(name.as_c_str(), MQ_OFlag::O_RDWR, Mode::empty(), None)?;
        Ok(Self {
            mqd,
            _marker: PhantomData,
        })
    }

    pub fn send(&self, value: &T) -> Result<(), ShmError> {
        let bytes = bincode::serialize(value).map_err(tsb_wire::WireError::Encode)?;
        if bytes.len() > MAX_MSG_SIZE {
            return Err(ShmError::MessageTooLarge {
                got: bytes.len(),
                max: MAX_MSG_SIZE,
            });
        }
        mq_send(&self.mqd, &bytes, 0)?;
        Ok(())
    }

    /// Sends the shutdown sentinel (an empty message).
    pub fn send_shutdown(&self) -> Result<(), ShmError> {
        mq_send(&self.mqd, &[], 0)?;
        Ok(())
    }

    /// Blocks until a message is available; `Ok(None)` means the
    /// shutdown sentinel was received.
    pub fn recv(&self) -> Result<Option<T>, ShmError> {
        let mut buf = vec![0u8; MAX_MSG_SIZE];
        let len = mq_receive(&self.mqd, &mut buf, &mut 0u32)?;
        if len == 0 {
            return Ok(None);
        }
        let value = bincode::deserialize(&buf[..len]).map_err(tsb_wire::WireError::Decode)?;
        Ok(Some(value))
    }
}
