use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use common::{DbConn, Error};
use credential::{Credential, NewCredential};
use image_processing::codecs::webp::WebPEncoder;
use image_processing::{ExtendedColorType, ImageEncoder, Luma};
use primitive_credential::PrimitiveCredential;
use qrcode::QrCode;
use uuid::Uuid;

/// Minimum width and height of a rendered QR code in pixels
const QR_MIN_DIMENSION: u32 = 512;

/// On-disk storage for credential artifacts
///
/// Paths stored in the database are relative to the root of the store
#[derive(Clone, Debug)]
pub struct ArtifactStore {
	root: PathBuf,
}

impl ArtifactStore {
	#[must_use]
	pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

	/// Resolve a stored relative path
	#[must_use]
	pub fn absolute(&self, rel_path: &str) -> PathBuf { self.root.join(rel_path) }

	/// Generate both an absolute and relative path for a new artifact
	///
	/// The absolute path is used for writing to disk, the relative path is
	/// stored on the credential
	fn fresh_paths(&self, reservation_id: i32) -> Result<(PathBuf, String), Error> {
		let rel_path = PathBuf::from("credentials")
			.join(reservation_id.to_string())
			.join(Uuid::new_v4().to_string())
			.with_extension("webp");

		let abs_path = self.root.join(&rel_path);

		if let Some(prefix) = abs_path.parent() {
			std::fs::create_dir_all(prefix)?;
		}

		Ok((abs_path, rel_path.to_string_lossy().into_owned()))
	}

	/// Render `payload` as a QR code and write it to `path`
	///
	/// The image is written to a temporary file next to `path` first and then
	/// moved into place, readers never observe a half written artifact
	pub fn write(&self, payload: &str, path: &Path) -> Result<(), Error> {
		let code = QrCode::new(payload.as_bytes())?;
		let image = code
			.render::<Luma<u8>>()
			.min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
			.build();

		let tmp_path = path.with_file_name(format!(".{}.tmp", Uuid::new_v4()));

		let written = (|| -> Result<(), Error> {
			let mut file = BufWriter::new(File::create(&tmp_path)?);

			WebPEncoder::new_lossless(&mut file).write_image(
				image.as_raw(),
				image.width(),
				image.height(),
				ExtendedColorType::L8,
			)?;

			file.flush()?;

			std::fs::rename(&tmp_path, path)?;

			Ok(())
		})();

		if written.is_err() {
			let _ = std::fs::remove_file(&tmp_path);
		}

		written
	}

	/// Remove an artifact, failures are logged and otherwise ignored
	pub fn remove(&self, rel_path: &str) {
		let path = self.absolute(rel_path);

		if let Err(e) = std::fs::remove_file(&path) {
			warn!("failed to remove artifact {} -- {e}", path.display());
		}
	}

	/// Render a credential to a fresh path and link it
	///
	/// Nothing is left on disk if linking fails or the credential was linked
	/// concurrently
	async fn link_fresh(
		&self,
		mut credential: Credential,
		payload: &str,
		conn: &DbConn,
	) -> Result<Credential, Error> {
		let c_id = credential.credential.id;
		let (abs_path, rel_path) = self.fresh_paths(credential.reservation.id)?;

		self.write(payload, &abs_path)?;

		match Credential::link_artifact(c_id, rel_path.clone(), conn).await {
			Ok(true) => {
				credential.credential.file_path = Some(rel_path);

				Ok(credential)
			},
			Ok(false) => {
				self.remove(&rel_path);

				Credential::get_by_id(c_id, conn).await
			},
			Err(e) => {
				self.remove(&rel_path);

				Err(e)
			},
		}
	}
}

/// Bring the artifact of a credential in line with its current data
///
/// While the reservation still has money due the artifact is left alone.
/// Otherwise a missing artifact is generated and an existing one is
/// overwritten in place, keeping its path.
#[instrument(skip(store, conn))]
pub async fn reconcile_artifact(
	c_id: i32,
	store: &ArtifactStore,
	conn: &DbConn,
) -> Result<Credential, Error> {
	let credential = Credential::get_by_id(c_id, conn).await?;

	if !credential.reservation.is_paid_off() {
		debug!("reservation {} is not paid off", credential.reservation.id);

		return Ok(credential);
	}

	let payload = credential.payload()?;

	match &credential.credential.file_path {
		Some(rel_path) => {
			store.write(&payload, &store.absolute(rel_path))?;

			// A concurrent revoke may have dropped the row and its file while
			// we were writing, the rename would then have recreated it
			if !Credential::is_linked(c_id, rel_path.clone(), conn).await? {
				store.remove(rel_path);

				return Err(Error::NotFound(format!(
					"credential with id {c_id}"
				)));
			}

			info!("regenerated artifact for credential with id {c_id}");

			Ok(credential)
		},
		None => store.link_fresh(credential, &payload, conn).await,
	}
}

/// Reconcile the artifact of a reservation's credential, if it has one
///
/// A credential that disappears halfway through is not an error, its artifact
/// went with it
#[instrument(skip(store, conn))]
pub async fn reconcile_reservation_artifact(
	r_id: i32,
	store: &ArtifactStore,
	conn: &DbConn,
) -> Result<(), Error> {
	let Some(credential) =
		PrimitiveCredential::for_reservation(r_id, conn).await?
	else {
		return Ok(());
	};

	match reconcile_artifact(credential.id, store, conn).await {
		Ok(_) | Err(Error::NotFound(_)) => Ok(()),
		Err(e) => Err(e),
	}
}

/// Issue a credential and render its artifact
///
/// If the artifact can not be produced the credential is removed again and
/// the error is returned
#[instrument(skip(store, conn))]
pub async fn issue_credential(
	new_credential: NewCredential,
	store: &ArtifactStore,
	conn: &DbConn,
) -> Result<Credential, Error> {
	let inserted = new_credential.insert(conn).await?;

	match reconcile_artifact(inserted.id, store, conn).await {
		Ok(credential) => Ok(credential),
		Err(e) => {
			if let Err(cleanup) = Credential::delete_by_id(inserted.id, conn).await
			{
				warn!(
					"failed to roll back credential with id {} -- {cleanup}",
					inserted.id
				);
			}

			Err(e)
		},
	}
}

/// Delete a credential from both the database and disk storage
#[instrument(skip(store, conn))]
pub async fn revoke_credential(
	c_id: i32,
	store: &ArtifactStore,
	conn: &DbConn,
) -> Result<PrimitiveCredential, Error> {
	// Delete the record before the file to prevent dangling paths
	let credential = Credential::delete_by_id(c_id, conn).await?;

	discard_artifact(store, &credential);

	Ok(credential)
}

/// Remove the artifact of an already deleted credential, if it has one
pub fn discard_artifact(store: &ArtifactStore, credential: &PrimitiveCredential) {
	if let Some(rel_path) = &credential.file_path {
		store.remove(rel_path);
	}
}
